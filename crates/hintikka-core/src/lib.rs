//! Core data structures for dynamic epistemic logic.
//!
//! A possible-worlds model is a labelled multigraph: nodes are worlds
//! carrying a [`Valuation`], and each agent owns an accessibility relation
//! encoding which worlds it cannot tell apart. [`Formula`] trees are
//! evaluated against a model by [`check::model_check`], which every
//! [`EpistemicModel`] representation shares.
//!
//! Three representations are provided:
//! - [`ExplicitEpistemicModel`]: worlds plus materialized per-agent edges.
//! - [`AgentExplicitEpistemicModel`]: a single agent whose relation is total
//!   over the current worlds, so no edges are stored at all.
//! - [`TemporalEpistemicModel`]: the single-agent model chained to the
//!   snapshot it was derived from, giving meaning to `Yesterday`.

pub mod check;
pub mod contract;
pub mod error;
pub mod formula;
pub mod graph;
pub mod model;
pub mod parse;
pub mod valuation;
pub mod world;

#[cfg(test)]
mod testing;

pub use check::model_check;
pub use error::{GraphError, ModelError, ParseError};
pub use formula::{create_update_formula, valuation_atomic_formulas, Formula};
pub use graph::{Graph, PathStep, Successors};
pub use model::agent::AgentExplicitEpistemicModel;
pub use model::explicit::ExplicitEpistemicModel;
pub use model::temporal::TemporalEpistemicModel;
pub use model::EpistemicModel;
pub use parse::{parse_formula, parse_formula_object};
pub use valuation::Valuation;
pub use world::{World, WorldValuation};
