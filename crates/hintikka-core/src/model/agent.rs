//! Single-agent models whose relation is implicitly total.
//!
//! Every world is every other world's successor, so the relation is never
//! stored: successor queries hand back the world list itself. Model checking
//! gives the same answers as an [`ExplicitEpistemicModel`] whose only agent
//! has the complete relation over the same worlds; [`to_explicit`] builds
//! that model for comparison.
//!
//! [`to_explicit`]: AgentExplicitEpistemicModel::to_explicit

use std::collections::HashMap;

use crate::error::ModelError;
use crate::graph::Successors;
use crate::model::explicit::ExplicitEpistemicModel;
use crate::model::EpistemicModel;
use crate::world::WorldValuation;

#[derive(Debug, Clone)]
pub struct AgentExplicitEpistemicModel {
    /// Always a single entry: the tracked agent.
    agents: Vec<String>,
    order: Vec<String>,
    worlds: HashMap<String, WorldValuation>,
}

impl AgentExplicitEpistemicModel {
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agents: vec![agent.into()],
            order: Vec::new(),
            worlds: HashMap::new(),
        }
    }

    /// The tracked agent.
    pub fn agent(&self) -> &str {
        &self.agents[0]
    }

    pub fn add_world(&mut self, id: impl Into<String>, world: WorldValuation) -> Result<(), ModelError> {
        let id = id.into();
        if self.worlds.contains_key(&id) {
            return Err(ModelError::DuplicateWorld(id));
        }
        self.order.push(id.clone());
        self.worlds.insert(id, world);
        Ok(())
    }

    /// `(id, world)` pairs in insertion order.
    pub fn worlds(&self) -> impl Iterator<Item = (&str, &WorldValuation)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.worlds.get(id).map(|w| (id.as_str(), w)))
    }

    /// The relation is already complete; only the endpoints are validated.
    pub fn add_edge(&mut self, _agent: &str, src: &str, dst: &str) -> Result<(), ModelError> {
        for id in [src, dst] {
            if !self.worlds.contains_key(id) {
                return Err(self.unknown_world(id));
            }
        }
        Ok(())
    }

    /// The relation is already complete.
    pub fn bulk_add_edges(&mut self, _agent: &str) {}

    /// Edges an explicit model would need for the same relation.
    pub fn simulated_edge_count(&self) -> usize {
        self.order.len() * self.order.len()
    }

    /// Materialize the implicit relation.
    pub fn to_explicit(&self) -> Result<ExplicitEpistemicModel, ModelError> {
        let mut explicit = ExplicitEpistemicModel::new([self.agent()]);
        for (id, world) in self.worlds() {
            explicit.add_world(id, world.clone())?;
        }
        explicit.bulk_add_edges(self.agent());
        if let Some(pointed) = self.pointed_world() {
            explicit.set_pointed_world(pointed)?;
        }
        Ok(explicit)
    }
}

impl EpistemicModel for AgentExplicitEpistemicModel {
    fn world(&self, id: &str) -> Option<&WorldValuation> {
        self.worlds.get(id)
    }

    fn world_ids(&self) -> &[String] {
        &self.order
    }

    /// The full world list, whatever the agent.
    fn successors(&self, id: &str, _agent: &str) -> Result<Successors<'_>, ModelError> {
        if !self.worlds.contains_key(id) {
            return Err(self.unknown_world(id));
        }
        Ok(Successors::All(&self.order))
    }

    /// The first world added.
    fn pointed_world(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    fn agents(&self) -> &[String] {
        &self.agents
    }

    fn edge_count(&self) -> usize {
        0
    }
}
