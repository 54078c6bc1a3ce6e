//! Explicit event models and the product update.

use hintikka_core::{EpistemicModel, ExplicitEpistemicModel, Formula, Graph, GraphError};
use tracing::{debug, warn};

use crate::error::{EventError, Result};
use crate::event::{Event, EventModel};
use crate::postcondition::Postcondition;

/// Id of the pair `(world, event)` in a product model.
pub fn product_world_id(world: &str, event: &str) -> String {
    format!("{world}_{event}")
}

/// A pointed graph of events with per-agent indistinguishability.
#[derive(Debug, Clone)]
pub struct ExplicitEventModel {
    graph: Graph<Event>,
    agents: Vec<String>,
}

impl ExplicitEventModel {
    /// An empty event model whose product relates worlds for `agents`.
    pub fn new<S: Into<String>>(agents: impl IntoIterator<Item = S>) -> Self {
        Self {
            graph: Graph::new(),
            agents: agents.into_iter().map(Into::into).collect(),
        }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    pub fn add_event(
        &mut self,
        id: impl Into<String>,
        precondition: Formula,
        postcondition: Postcondition,
    ) -> Result<()> {
        self.graph
            .add_node(id, Event::new(precondition, postcondition))?;
        Ok(())
    }

    pub fn add_edge(&mut self, agent: &str, src: &str, dst: &str) -> Result<()> {
        self.graph.add_edge(agent, src, dst).map_err(|e| match e {
            GraphError::UnknownNode(id) => EventError::UnknownEvent(id),
            other => other.into(),
        })
    }

    pub fn set_pointed_event(&mut self, id: &str) -> Result<()> {
        self.graph
            .set_pointed_node(id)
            .map_err(|_| EventError::UnknownEvent(id.to_string()))
    }

    pub fn pointed_event(&self) -> Option<&str> {
        self.graph.pointed_node()
    }

    pub fn event(&self, id: &str) -> Result<&Event> {
        self.graph
            .node(id)
            .ok_or_else(|| EventError::UnknownEvent(id.to_string()))
    }

    pub fn precondition(&self, id: &str) -> Result<&Formula> {
        Ok(&self.event(id)?.precondition)
    }

    pub fn postcondition(&self, id: &str) -> Result<&Postcondition> {
        Ok(&self.event(id)?.postcondition)
    }

    /// `(id, event)` pairs in insertion order.
    pub fn events(&self) -> impl Iterator<Item = (&str, &Event)> + '_ {
        self.graph.nodes()
    }

    pub fn event_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the pointed event's precondition holds at `model`'s pointed world.
    pub fn is_applicable_in<M>(&self, model: &M) -> Result<bool>
    where
        M: EpistemicModel + ?Sized,
    {
        let pointed = self.pointed_event().ok_or(EventError::NoPointedEvent)?;
        Ok(model.check(self.precondition(pointed)?)?)
    }

    /// The product of `model` with this event model.
    ///
    /// Worlds are the pairs `(w, e)` where `e`'s precondition holds at `w`,
    /// named `w_e`. Agent `a` relates `(w1, e1)` to `(w2, e2)` when it
    /// relates `w1` to `w2` and `e1` to `e2`. Fails with
    /// [`EventError::Contradictory`] when no pair survives, and with
    /// [`EventError::NotApplicable`] when the pointed pair does not.
    pub fn product<M>(&self, model: &M) -> Result<ExplicitEpistemicModel>
    where
        M: EpistemicModel + ?Sized,
    {
        let mut result = ExplicitEpistemicModel::new(self.agents.iter().cloned());

        for w in model.world_ids() {
            for (e, event) in self.graph.nodes() {
                if model.model_check(w, &event.precondition)? {
                    let content = event.postcondition.perform(model, w)?;
                    result.add_world(product_world_id(w, e), content)?;
                }
            }
        }

        if result.world_count() == 0 {
            warn!(
                worlds = model.world_count(),
                events = self.event_count(),
                "product left no worlds"
            );
            return Err(EventError::Contradictory);
        }

        for w1 in model.world_ids() {
            for e1 in self.graph.node_ids() {
                let we1 = product_world_id(w1, e1);
                if result.world(&we1).is_none() {
                    continue;
                }
                for agent in &self.agents {
                    let events = self.graph.successors(e1, agent)?;
                    if events.is_empty() {
                        continue;
                    }
                    for w2 in model.successors(w1, agent)? {
                        for e2 in events {
                            let we2 = product_world_id(w2, e2);
                            if result.world(&we2).is_some() {
                                result.add_edge(agent, &we1, &we2)?;
                            }
                        }
                    }
                }
            }
        }

        if let (Some(w), Some(e)) = (model.pointed_world(), self.pointed_event()) {
            let pointed = product_world_id(w, e);
            if result.world(&pointed).is_none() {
                warn!(world = w, event = e, "pointed pair did not survive");
                return Err(EventError::NotApplicable {
                    world: w.to_string(),
                    event: e.to_string(),
                });
            }
            result.set_pointed_world(&pointed)?;
        }

        debug!(
            worlds = result.world_count(),
            edges = result.edge_count(),
            pointed = result.pointed_world(),
            "product built"
        );
        Ok(result)
    }

    /// Alias of [`product`](Self::product).
    pub fn apply<M>(&self, model: &M) -> Result<ExplicitEpistemicModel>
    where
        M: EpistemicModel + ?Sized,
    {
        self.product(model)
    }

    /// Apply, then drop every world unreachable from the new pointed world.
    pub fn apply_and_prune<M>(&self, model: &M) -> Result<ExplicitEpistemicModel>
    where
        M: EpistemicModel + ?Sized,
    {
        let mut result = self.product(model)?;
        if result.pointed_world().is_some() {
            result.remove_unreachable_from_pointed()?;
        }
        Ok(result)
    }

    /// Public announcement of `formula` to `agents`.
    ///
    /// Event `e` (precondition `formula`) is pointed and sees only itself.
    /// Event `f` (precondition `not formula`) points to `e` and to itself.
    pub fn public_announcement<S: Into<String>>(
        formula: Formula,
        agents: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut model = Self::new(agents);
        model.insert_event("e", formula.clone());
        model.insert_event("f", formula.negate());
        for agent in model.agents.clone() {
            model.link(&agent, "e", "e");
            model.link(&agent, "f", "e");
            model.link(&agent, "f", "f");
        }
        model.point("e");
        model
    }

    /// `agent` privately learns `formula`; the other agents believe nothing happened.
    pub fn private_announcement<S: Into<String>>(
        formula: Formula,
        agent: &str,
        agents: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut model = Self::new(agents);
        model.insert_event("e", formula);
        model.insert_event("t", Formula::True);
        model.link(agent, "e", "e");
        model.link(agent, "t", "t");
        for other in model.agents.clone() {
            if other != agent {
                model.link(&other, "e", "t");
                model.link(&other, "t", "t");
            }
        }
        model.point("e");
        model
    }

    /// `agent` learns whether `formula` holds; the others know that it did.
    pub fn semi_private_announcement<S: Into<String>>(
        formula: Formula,
        agent: &str,
        agents: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut model = Self::new(agents);
        model.insert_event("e", formula.clone());
        model.insert_event("t", formula.negate());
        model.link(agent, "e", "e");
        model.link(agent, "t", "t");
        for other in model.agents.clone() {
            if other != agent {
                for (src, dst) in [("e", "e"), ("e", "t"), ("t", "e"), ("t", "t")] {
                    model.link(&other, src, dst);
                }
            }
        }
        model.point("e");
        model
    }

    // Builders for the fixed shapes above: ids are literals that were just
    // inserted, so graph errors cannot occur.
    fn insert_event(&mut self, id: &str, precondition: Formula) {
        let _ = self.graph.add_node(id, Event::trivial(precondition));
    }

    fn link(&mut self, agent: &str, src: &str, dst: &str) {
        let _ = self.graph.add_edge(agent, src, dst);
    }

    fn point(&mut self, id: &str) {
        let _ = self.graph.set_pointed_node(id);
    }
}

impl<M: EpistemicModel + ?Sized> EventModel<M> for ExplicitEventModel {
    type Output = ExplicitEpistemicModel;

    fn is_applicable_in(&self, model: &M) -> Result<bool> {
        ExplicitEventModel::is_applicable_in(self, model)
    }

    fn apply(&self, model: &M) -> Result<ExplicitEpistemicModel> {
        self.product(model)
    }
}
