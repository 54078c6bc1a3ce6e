//! Event models and the product update.
//!
//! An event model is a small graph of events, each with a precondition that
//! says where it can happen and a [`Postcondition`] that says what it does to
//! a world. Applying an event model to an epistemic model builds a fresh
//! model from every `(world, event)` pair whose precondition holds; the input
//! model is never modified.
//!
//! - [`ExplicitEventModel`]: the general product, plus public, private and
//!   semi-private announcement shapes.
//! - [`ExplicitFilterEventModel`]: one agent learns a formula.
//! - [`agent`]: updates for single-agent models with an implicit total
//!   relation, which only ever filter or rewrite worlds.

pub mod agent;
pub mod error;
pub mod event;
pub mod explicit;
pub mod filter;
pub mod postcondition;

pub use agent::{AgentEventModel, AgentPublicAnnouncement, AgentTransitionEvent};
pub use error::{EventError, Result};
pub use event::{Event, EventModel};
pub use explicit::ExplicitEventModel;
pub use filter::ExplicitFilterEventModel;
pub use postcondition::Postcondition;
