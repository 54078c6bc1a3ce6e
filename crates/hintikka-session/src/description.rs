//! JSON model descriptions.
//!
//! ```json
//! {
//!   "name": "coin",
//!   "propositions": ["heads"],
//!   "initialModel": {
//!     "worlds": [{"name": "w1", "props": ["heads"]}, {"name": "w2", "props": []}],
//!     "edges": [{"agentName": "a", "worldOne": "w1", "worldTwo": "w2"}],
//!     "pointedWorld": "w1"
//!   },
//!   "actions": [{"description": "reveal", "formula": "heads"}]
//! }
//! ```
//!
//! Without `edges`, the default agent gets the complete relation. Without
//! `pointedWorld`, the first world is pointed.

use std::collections::BTreeSet;

use hintikka_core::{
    create_update_formula, parse_formula, AgentExplicitEpistemicModel, EpistemicModel,
    ExplicitEpistemicModel, Formula, WorldValuation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::Fingerprint;
use crate::error::{Result, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propositions: Option<Vec<String>>,
    pub initial_model: InitialModel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialModel {
    pub worlds: Vec<WorldDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<EdgeDescription>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointed_world: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldDescription {
    pub name: String,
    #[serde(default)]
    pub props: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDescription {
    pub agent_name: String,
    pub world_one: String,
    pub world_two: String,
}

/// A named public announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub description: String,
    pub formula: String,
}

impl ModelDescription {
    pub fn from_json(text: &str) -> Result<Self> {
        let description: ModelDescription = serde_json::from_str(text)?;
        if description.initial_model.worlds.is_empty() {
            return Err(SessionError::Description("the model has no worlds".into()));
        }
        Ok(description)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("untitled")
    }

    /// The declared propositions, or every proposition some world makes true.
    pub fn propositions(&self) -> Vec<String> {
        if let Some(declared) = &self.propositions {
            return declared.clone();
        }
        let found: BTreeSet<&str> = self
            .initial_model
            .worlds
            .iter()
            .flat_map(|w| w.props.iter().map(String::as_str))
            .collect();
        found.into_iter().map(str::to_string).collect()
    }

    /// Content hash of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        let bytes = serde_json::to_vec(self)?;
        Ok(Fingerprint::compute(&bytes))
    }

    /// Build the explicit initial model.
    pub fn build_explicit(&self, default_agent: &str) -> Result<ExplicitEpistemicModel> {
        let raw = &self.initial_model;
        let mut model = ExplicitEpistemicModel::new([default_agent]);
        for world in &raw.worlds {
            model.add_world(
                world.name.clone(),
                WorldValuation::from_true(world.props.iter().cloned()),
            )?;
        }
        match &raw.edges {
            Some(edges) => {
                for edge in edges {
                    model.add_edge(&edge.agent_name, &edge.world_one, &edge.world_two)?;
                }
            }
            None => model.bulk_add_edges(default_agent),
        }
        match &raw.pointed_world {
            Some(id) => model.set_pointed_world(id)?,
            None => {
                model.set_pointed_world_satisfying(&create_update_formula(&Default::default()))?;
            }
        }
        debug!(
            name = self.name(),
            worlds = model.world_count(),
            edges = model.edge_count(),
            "built explicit model"
        );
        Ok(model)
    }

    /// Build the single-agent initial model. Edges and the pointed world are
    /// implicit in that representation and are ignored.
    pub fn build_agent(&self, agent: &str) -> Result<AgentExplicitEpistemicModel> {
        let mut model = AgentExplicitEpistemicModel::new(agent);
        for world in &self.initial_model.worlds {
            model.add_world(
                world.name.clone(),
                WorldValuation::from_true(world.props.iter().cloned()),
            )?;
        }
        debug!(
            name = self.name(),
            worlds = model.world_count(),
            simulated_edges = model.simulated_edge_count(),
            "built agent model"
        );
        Ok(model)
    }

    /// The formula of the action named `name`.
    pub fn action_formula(&self, name: &str) -> Result<Formula> {
        let action = self
            .actions
            .iter()
            .find(|a| a.description == name)
            .ok_or_else(|| SessionError::Description(format!("no action named {name}")))?;
        Ok(parse_formula(&action.formula)?)
    }

    /// Describe an explicit model, edges and pointed world included.
    pub fn from_model(name: Option<String>, model: &ExplicitEpistemicModel) -> Self {
        let worlds = model
            .worlds()
            .map(|(id, world)| WorldDescription {
                name: id.to_string(),
                props: world
                    .valuation
                    .true_propositions()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect();
        let edges = model
            .graph()
            .edges()
            .map(|(agent, src, dst)| EdgeDescription {
                agent_name: agent.to_string(),
                world_one: src.to_string(),
                world_two: dst.to_string(),
            })
            .collect();
        ModelDescription {
            name,
            propositions: None,
            initial_model: InitialModel {
                worlds,
                edges: Some(edges),
                pointed_world: model.pointed_world().map(str::to_string),
            },
            actions: Vec::new(),
        }
    }
}
