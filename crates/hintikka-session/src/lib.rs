//! Sessions over a single evolving epistemic model.
//!
//! A [`Session`] owns one [`ModelDescription`], the model currently in force,
//! and the last knowledge valuation it was updated with. Queries evaluate
//! formulas against the current model; updates compute a candidate model in
//! full and only then replace the current one, so a failed update leaves the
//! session exactly as it was.
//!
//! The external valuation solver is reached through [`ValuationSource`]; the
//! crate only renders formulas for it and turns its answers into worlds.

pub mod cache;
pub mod config;
pub mod description;
pub mod error;
pub mod query;
pub mod session;
pub mod solver;

pub use cache::{DescriptionCache, Fingerprint};
pub use config::{Representation, SessionConfig};
pub use description::ModelDescription;
pub use error::{Result, SessionError, SolverError};
pub use query::{evaluate_queries, Modality, Query};
pub use session::{CurrentModel, ModelSummary, Session, TransitionSpec, UpdateOutcome};
pub use solver::{render_touist, seed_agent_model, AtomCompaction, StaticValuations, ValuationSource};
