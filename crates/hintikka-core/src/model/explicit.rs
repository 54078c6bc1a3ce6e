//! Explicit Kripke models: every world and every edge is stored.

use tracing::debug;

use crate::contract;
use crate::error::{GraphError, ModelError};
use crate::formula::Formula;
use crate::graph::{Graph, PathStep, Successors};
use crate::model::EpistemicModel;
use crate::world::WorldValuation;

/// A pointed epistemic model over an explicit relation graph.
#[derive(Debug, Clone, Default)]
pub struct ExplicitEpistemicModel {
    graph: Graph<WorldValuation>,
    agents: Vec<String>,
}

impl ExplicitEpistemicModel {
    /// Create an empty model for the given agents.
    pub fn new<S: Into<String>>(agents: impl IntoIterator<Item = S>) -> Self {
        let mut model = Self::default();
        for agent in agents {
            model.register_agent(agent.into());
        }
        model
    }

    fn register_agent(&mut self, agent: String) {
        if !self.agents.contains(&agent) {
            self.agents.push(agent);
        }
    }

    /// Attach a graph error to the world ids of this model.
    fn world_error(&self, err: GraphError) -> ModelError {
        match err {
            GraphError::UnknownNode(id) => self.unknown_world(&id),
            other => ModelError::from_graph(other),
        }
    }

    pub fn graph(&self) -> &Graph<WorldValuation> {
        &self.graph
    }

    pub fn add_world(&mut self, id: impl Into<String>, world: WorldValuation) -> Result<(), ModelError> {
        self.graph.add_node(id, world).map_err(ModelError::from_graph)
    }

    /// `(id, world)` pairs in insertion order.
    pub fn worlds(&self) -> impl Iterator<Item = (&str, &WorldValuation)> + '_ {
        self.graph.nodes()
    }

    pub fn add_edge(&mut self, agent: &str, src: &str, dst: &str) -> Result<(), ModelError> {
        if let Err(e) = self.graph.add_edge(agent, src, dst) {
            return Err(self.world_error(e));
        }
        self.register_agent(agent.to_string());
        Ok(())
    }

    /// Make `agent`'s relation complete in one pass.
    pub fn bulk_add_edges(&mut self, agent: &str) {
        self.graph.bulk_add_edges(agent);
        self.register_agent(agent.to_string());
    }

    pub fn add_edge_if<F>(&mut self, agent: &str, condition: F)
    where
        F: FnMut(&WorldValuation, &WorldValuation) -> bool,
    {
        self.graph.add_edge_if(agent, condition);
        self.register_agent(agent.to_string());
    }

    pub fn add_edges_cluster(&mut self, agent: &str, ids: &[&str]) -> Result<(), ModelError> {
        if let Err(e) = self.graph.add_edges_cluster(agent, ids) {
            return Err(self.world_error(e));
        }
        self.register_agent(agent.to_string());
        Ok(())
    }

    pub fn make_reflexive_relation(&mut self, agent: &str) {
        self.graph.make_reflexive_relation(agent);
        self.register_agent(agent.to_string());
    }

    pub fn make_complete_relation(&mut self, agent: &str) {
        self.graph.make_complete_relation(agent);
        self.register_agent(agent.to_string());
    }

    pub fn make_symmetric_relation(&mut self, agent: &str) {
        self.graph.make_symmetric_relation(agent);
    }

    pub fn is_edge(&self, agent: &str, src: &str, dst: &str) -> bool {
        self.graph.is_edge(agent, src, dst)
    }

    /// Point the model at world `id`.
    pub fn set_pointed_world(&mut self, id: &str) -> Result<(), ModelError> {
        if let Err(e) = self.graph.set_pointed_node(id) {
            return Err(self.world_error(e));
        }
        Ok(())
    }

    /// Point the model at the first world satisfying `formula`, keeping the
    /// current pointed world when it still satisfies it. Returns the chosen id.
    pub fn set_pointed_world_satisfying(&mut self, formula: &Formula) -> Result<String, ModelError> {
        let found = self
            .find_world_satisfying(formula)?
            .map(str::to_string)
            .ok_or_else(|| ModelError::NoSatisfyingWorld(formula.to_string()))?;
        self.set_pointed_world(&found)?;
        Ok(found)
    }

    /// Remove every world unreachable from `seeds`. Returns how many were removed.
    pub fn remove_unreachable_from(&mut self, seeds: &[&str]) -> Result<usize, ModelError> {
        match self.graph.remove_unreachable_from(seeds) {
            Ok(removed) => {
                debug!(removed, remaining = self.graph.node_count(), "pruned unreachable worlds");
                Ok(removed)
            }
            Err(e) => Err(self.world_error(e)),
        }
    }

    /// Keep only the part of the model reachable from the pointed world.
    pub fn remove_unreachable_from_pointed(&mut self) -> Result<usize, ModelError> {
        let pointed = self
            .graph
            .pointed_node()
            .map(str::to_string)
            .ok_or(ModelError::NoPointedWorld)?;
        self.remove_unreachable_from(&[pointed.as_str()])
    }

    pub fn shortest_path(&self, src: &str, dst: &str) -> Result<Option<Vec<PathStep>>, ModelError> {
        self.graph
            .shortest_path(src, dst)
            .map_err(|e| self.world_error(e))
    }

    /// The bisimulation quotient with respect to `agents`.
    pub fn contract(&self, agents: &[String]) -> Result<ExplicitEpistemicModel, ModelError> {
        contract::contract(self, agents)
    }
}

impl EpistemicModel for ExplicitEpistemicModel {
    fn world(&self, id: &str) -> Option<&WorldValuation> {
        self.graph.node(id)
    }

    fn world_ids(&self) -> &[String] {
        self.graph.node_id_slice()
    }

    fn successors(&self, id: &str, agent: &str) -> Result<Successors<'_>, ModelError> {
        self.graph
            .successors(id, agent)
            .map_err(|e| self.world_error(e))
    }

    fn pointed_world(&self) -> Option<&str> {
        self.graph.pointed_node()
    }

    fn agents(&self) -> &[String] {
        &self.agents
    }

    fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> Formula {
        Formula::atom("p")
    }

    fn uncertain() -> ExplicitEpistemicModel {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        m.add_world("w1", WorldValuation::from_true(["p"])).unwrap();
        m.add_world("w2", WorldValuation::default()).unwrap();
        m.bulk_add_edges("a");
        m.set_pointed_world("w1").unwrap();
        m
    }

    #[test]
    fn duplicate_world_is_a_world_error() {
        let mut m = uncertain();
        assert_eq!(
            m.add_world("w1", WorldValuation::default()),
            Err(ModelError::DuplicateWorld("w1".into()))
        );
    }

    #[test]
    fn unknown_world_lists_existing_ids() {
        let mut m = uncertain();
        match m.add_edge("a", "w1", "w9") {
            Err(ModelError::UnknownWorld { id, known }) => {
                assert_eq!(id, "w9");
                assert!(known.starts_with("w1, w2"));
            }
            other => panic!("expected unknown world, got {other:?}"),
        }
        assert!(m.set_pointed_world("w9").is_err());
    }

    #[test]
    fn knowledge_and_possibility() {
        let m = uncertain();
        assert!(!m.model_check("w1", &Formula::k("a", p())).unwrap());
        assert!(m.model_check("w1", &Formula::kpos("a", p())).unwrap());
    }

    #[test]
    fn pointing_by_formula() {
        let mut m = uncertain();
        let chosen = m.set_pointed_world_satisfying(&p().negate()).unwrap();
        assert_eq!(chosen, "w2");
        assert_eq!(m.pointed_world(), Some("w2"));
        assert_eq!(
            m.set_pointed_world_satisfying(&Formula::False),
            Err(ModelError::NoSatisfyingWorld("bottom".into()))
        );
        assert_eq!(m.pointed_world(), Some("w2"));
    }

    #[test]
    fn edges_register_agents() {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        m.add_world("w", WorldValuation::default()).unwrap();
        m.add_edge("b", "w", "w").unwrap();
        assert_eq!(m.agents(), ["a".to_string(), "b".to_string()]);
        assert_eq!(m.edge_count(), 1);
    }

    #[test]
    fn prune_from_pointed() {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        for id in ["w1", "w2", "w3"] {
            m.add_world(id, WorldValuation::default()).unwrap();
        }
        m.add_edge("a", "w1", "w2").unwrap();
        m.set_pointed_world("w1").unwrap();
        assert_eq!(m.remove_unreachable_from_pointed().unwrap(), 1);
        assert_eq!(m.world_ids(), ["w1".to_string(), "w2".to_string()]);
    }

    #[test]
    fn path_between_worlds() {
        let m = uncertain();
        let path = m.shortest_path("w1", "w2").unwrap().unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].agent, "a");
        assert!(m.shortest_path("w1", "w7").is_err());
    }
}
