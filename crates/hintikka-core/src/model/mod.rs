//! Epistemic models: worlds, per-agent accessibility, and a pointed world.
//!
//! [`EpistemicModel`] is the capability every representation provides to the
//! model checker. Concrete representations are chosen at construction time:
//!
//! - [`explicit::ExplicitEpistemicModel`] stores every edge in a [`Graph`](crate::Graph).
//! - [`agent::AgentExplicitEpistemicModel`] keeps a single agent whose relation
//!   is implicitly total, so no edges are materialized.
//! - [`temporal::TemporalEpistemicModel`] chains agent models into a history
//!   so `Yesterday` has something to look at.

pub mod agent;
pub mod explicit;
pub mod temporal;

use std::collections::BTreeSet;

use crate::check;
use crate::error::ModelError;
use crate::formula::Formula;
use crate::graph::Successors;
use crate::valuation::Valuation;
use crate::world::{World, WorldValuation};

/// Read access to a pointed Kripke structure.
pub trait EpistemicModel {
    /// Content of world `id`, if present.
    fn world(&self, id: &str) -> Option<&WorldValuation>;

    /// World ids in insertion order.
    fn world_ids(&self) -> &[String];

    /// Worlds `agent` cannot distinguish from `id`.
    fn successors(&self, id: &str, agent: &str) -> Result<Successors<'_>, ModelError>;

    /// The actual world, if one has been chosen.
    fn pointed_world(&self) -> Option<&str>;

    /// Agents whose relations this model carries.
    fn agents(&self) -> &[String];

    /// Number of materialized edges.
    fn edge_count(&self) -> usize;

    fn world_count(&self) -> usize {
        self.world_ids().len()
    }

    /// The snapshot `Yesterday` formulas are evaluated against.
    fn previous(&self) -> Option<&dyn EpistemicModel> {
        None
    }

    /// Evaluate `formula` at world `id`.
    fn model_check(&self, id: &str, formula: &Formula) -> Result<bool, ModelError> {
        check::model_check(self, id, formula)
    }

    /// Evaluate `formula` at the pointed world.
    fn check(&self, formula: &Formula) -> Result<bool, ModelError> {
        let pointed = self.pointed_world().ok_or(ModelError::NoPointedWorld)?;
        check::model_check(self, pointed, formula)
    }

    /// Error for a world id this model does not contain.
    fn unknown_world(&self, id: &str) -> ModelError {
        ModelError::unknown_world(id, self.world_ids().iter().map(String::as_str))
    }

    /// The first world satisfying `formula`: the pointed world if it still
    /// qualifies, otherwise the first match in insertion order.
    fn find_world_satisfying(&self, formula: &Formula) -> Result<Option<&str>, ModelError> {
        if let Some(pointed) = self.pointed_world() {
            if self.model_check(pointed, formula)? {
                return Ok(Some(pointed));
            }
        }
        for id in self.world_ids() {
            if self.model_check(id, formula)? {
                return Ok(Some(id.as_str()));
            }
        }
        Ok(None)
    }

    /// Whether some world satisfies `formula`. Never mutates the model.
    fn has_possible_world(&self, formula: &Formula) -> bool {
        matches!(self.find_world_satisfying(formula), Ok(Some(_)))
    }

    /// Propositions whose value `agent` is certain of at `world` (the pointed
    /// world when `None`).
    ///
    /// A proposition is kept when it has the same closed-world value at
    /// `world` and every `agent`-successor. Candidates are the propositions
    /// explicitly mentioned by any of those worlds.
    fn obtain_knowledge(&self, agent: &str, world: Option<&str>) -> Result<Valuation, ModelError> {
        let id = match world {
            Some(id) => id,
            None => self.pointed_world().ok_or(ModelError::NoPointedWorld)?,
        };
        let here = self.world(id).ok_or_else(|| self.unknown_world(id))?;
        let successors = self.successors(id, agent)?;

        let mut others: Vec<&WorldValuation> = Vec::with_capacity(successors.len());
        for s in successors {
            others.push(self.world(s).ok_or_else(|| self.unknown_world(s))?);
        }

        let mut candidates: BTreeSet<&str> = here.valuation.keys().collect();
        for w in &others {
            candidates.extend(w.valuation.keys());
        }

        let mut known = Valuation::default();
        for p in candidates {
            let value = here.model_check(p);
            if others.iter().all(|w| w.model_check(p) == value) {
                known.set(p, value);
            }
        }
        Ok(known)
    }
}
