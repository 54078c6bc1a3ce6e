//! Updates for single-agent models with an implicit total relation.
//!
//! Since every surviving world stays indistinguishable from every other, an
//! update only has to decide which worlds survive and what they contain.
//! Surviving worlds are named `w_e`; an update that leaves no world is
//! contradictory.

use hintikka_core::{
    AgentExplicitEpistemicModel, EpistemicModel, ExplicitEpistemicModel, Formula, GraphError,
    WorldValuation,
};
use tracing::{debug, warn};

use crate::error::{EventError, Result};
use crate::event::{Event, EventModel};
use crate::explicit::{product_world_id, ExplicitEventModel};
use crate::postcondition::Postcondition;

fn non_empty(model: AgentExplicitEpistemicModel, what: &str) -> Result<AgentExplicitEpistemicModel> {
    if model.world_count() == 0 {
        warn!(update = what, "no resulting worlds");
        return Err(EventError::Contradictory);
    }
    debug!(update = what, worlds = model.world_count(), "agent model updated");
    Ok(model)
}

/// Events applied to an agent model without any event relation.
#[derive(Debug, Clone, Default)]
pub struct AgentEventModel {
    events: Vec<(String, Event)>,
}

impl AgentEventModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(
        &mut self,
        id: impl Into<String>,
        precondition: Formula,
        postcondition: Postcondition,
    ) -> Result<()> {
        let id = id.into();
        if self.events.iter().any(|(existing, _)| *existing == id) {
            return Err(GraphError::DuplicateNode(id).into());
        }
        self.events.push((id, Event::new(precondition, postcondition)));
        Ok(())
    }

    pub fn events(&self) -> impl Iterator<Item = (&str, &Event)> + '_ {
        self.events.iter().map(|(id, e)| (id.as_str(), e))
    }
}

impl EventModel<AgentExplicitEpistemicModel> for AgentEventModel {
    type Output = AgentExplicitEpistemicModel;

    /// The agent is assumed to have revised its beliefs already.
    fn is_applicable_in(&self, _model: &AgentExplicitEpistemicModel) -> Result<bool> {
        Ok(true)
    }

    /// One world `w_e` per world `w` and event `e` whose precondition holds there.
    fn apply(&self, model: &AgentExplicitEpistemicModel) -> Result<AgentExplicitEpistemicModel> {
        let mut result = AgentExplicitEpistemicModel::new(model.agent());
        for w in model.world_ids() {
            for (e, event) in &self.events {
                if model.model_check(w, &event.precondition)? {
                    let content = event.postcondition.perform(model, w)?;
                    result.add_world(product_world_id(w, e), content)?;
                }
            }
        }
        non_empty(result, "events")
    }
}

/// The agent learns that `formula` holds.
#[derive(Debug, Clone)]
pub struct AgentPublicAnnouncement {
    formula: Formula,
}

impl AgentPublicAnnouncement {
    pub fn new(formula: Formula) -> Self {
        Self { formula }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }
}

impl EventModel<AgentExplicitEpistemicModel> for AgentPublicAnnouncement {
    type Output = AgentExplicitEpistemicModel;

    fn is_applicable_in(&self, _model: &AgentExplicitEpistemicModel) -> Result<bool> {
        Ok(true)
    }

    /// Keep the worlds satisfying the formula.
    fn apply(&self, model: &AgentExplicitEpistemicModel) -> Result<AgentExplicitEpistemicModel> {
        let mut result = AgentExplicitEpistemicModel::new(model.agent());
        for (w, world) in model.worlds() {
            if model.model_check(w, &self.formula)? {
                result.add_world(product_world_id(w, "e"), world.clone())?;
            }
        }
        non_empty(result, "announcement")
    }
}

impl EventModel<ExplicitEpistemicModel> for AgentPublicAnnouncement {
    type Output = ExplicitEpistemicModel;

    fn is_applicable_in(&self, model: &ExplicitEpistemicModel) -> Result<bool> {
        Ok(model.check(&self.formula)?)
    }

    /// Without the implicit relation, fall back to the full public announcement.
    fn apply(&self, model: &ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        ExplicitEventModel::public_announcement(self.formula.clone(), model.agents().iter().cloned())
            .product(model)
    }
}

/// Move each world to the target of the first transition whose guard holds.
///
/// Worlds with no matching guard do not survive.
#[derive(Debug, Clone)]
pub struct AgentTransitionEvent {
    post: Postcondition,
}

impl AgentTransitionEvent {
    /// `transitions` pairs a guard proposition with the world it leads to.
    pub fn new(transitions: Vec<(String, WorldValuation)>) -> Self {
        Self {
            post: Postcondition::WorldTransfer(transitions),
        }
    }

    pub fn postcondition(&self) -> &Postcondition {
        &self.post
    }
}

impl EventModel<AgentExplicitEpistemicModel> for AgentTransitionEvent {
    type Output = AgentExplicitEpistemicModel;

    fn is_applicable_in(&self, _model: &AgentExplicitEpistemicModel) -> Result<bool> {
        Ok(true)
    }

    fn apply(&self, model: &AgentExplicitEpistemicModel) -> Result<AgentExplicitEpistemicModel> {
        let mut result = AgentExplicitEpistemicModel::new(model.agent());
        for w in model.world_ids() {
            match self.post.perform(model, w) {
                Ok(target) => result.add_world(product_world_id(w, "e"), target)?,
                Err(EventError::NoTransition(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        non_empty(result, "transition")
    }
}
