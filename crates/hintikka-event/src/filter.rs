//! One agent learns that a formula holds.
//!
//! The event model has two events, `e` (the formula) and `f` (its negation),
//! each related only to itself. The product therefore splits the model into
//! a formula part and a negation part with no edges between them, and the
//! pointed world lands in the formula part. [`ExplicitFilterEventModel::apply_filtered`]
//! builds just that part directly.

use hintikka_core::{EpistemicModel, ExplicitEpistemicModel, Formula};
use tracing::debug;

use crate::error::{EventError, Result};
use crate::event::EventModel;
use crate::explicit::{product_world_id, ExplicitEventModel};
use crate::postcondition::Postcondition;

#[derive(Debug, Clone)]
pub struct ExplicitFilterEventModel {
    formula: Formula,
    agent: String,
    events: ExplicitEventModel,
}

impl ExplicitFilterEventModel {
    /// `agent` receives the information `formula`.
    pub fn new_information(formula: Formula, agent: impl Into<String>) -> Result<Self> {
        let agent = agent.into();
        let mut events = ExplicitEventModel::new([agent.clone()]);
        events.add_event("e", formula.clone(), Postcondition::Trivial)?;
        events.add_event("f", formula.clone().negate(), Postcondition::Trivial)?;
        events.add_edge(&agent, "e", "e")?;
        events.add_edge(&agent, "f", "f")?;
        events.set_pointed_event("e")?;
        Ok(Self {
            formula,
            agent,
            events,
        })
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn event_model(&self) -> &ExplicitEventModel {
        &self.events
    }

    /// Whether some world of `model` satisfies the formula.
    pub fn is_applicable_in(&self, model: &ExplicitEpistemicModel) -> bool {
        model.has_possible_world(&self.formula)
    }

    fn repointed(&self, model: &ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        if !self.is_applicable_in(model) {
            return Err(EventError::Contradictory);
        }
        let mut start = model.clone();
        start.set_pointed_world_satisfying(&self.formula)?;
        Ok(start)
    }

    /// Point a copy of `model` at a world satisfying the formula, then run
    /// the full product.
    pub fn apply(&self, model: &ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        let start = self.repointed(model)?;
        self.events.product(&start)
    }

    /// Same answers at the pointed world as [`apply`](Self::apply), without
    /// building the negation part: keeps the worlds satisfying the formula,
    /// renamed `w_e`, and the agent's edges among them.
    pub fn apply_filtered(&self, model: &ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        let start = self.repointed(model)?;
        let mut result = ExplicitEpistemicModel::new([self.agent.clone()]);

        let mut kept: Vec<&str> = Vec::new();
        for (id, world) in start.worlds() {
            if start.model_check(id, &self.formula)? {
                result.add_world(product_world_id(id, "e"), world.clone())?;
                kept.push(id);
            }
        }
        for src in &kept {
            for dst in start.successors(src, &self.agent)? {
                let target = product_world_id(dst, "e");
                if result.world(&target).is_some() {
                    result.add_edge(&self.agent, &product_world_id(src, "e"), &target)?;
                }
            }
        }
        if let Some(pointed) = start.pointed_world() {
            result.set_pointed_world(&product_world_id(pointed, "e"))?;
        }
        debug!(kept = kept.len(), of = start.world_count(), "filtered model");
        Ok(result)
    }
}

impl EventModel<ExplicitEpistemicModel> for ExplicitFilterEventModel {
    type Output = ExplicitEpistemicModel;

    fn is_applicable_in(&self, model: &ExplicitEpistemicModel) -> Result<bool> {
        Ok(ExplicitFilterEventModel::is_applicable_in(self, model))
    }

    fn apply(&self, model: &ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        ExplicitFilterEventModel::apply(self, model)
    }
}
