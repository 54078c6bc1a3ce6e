//! Session configuration.

use serde::{Deserialize, Serialize};

/// Which concrete model a session keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    /// Explicit worlds and edges for every agent. Updates filter the initial
    /// model with the default agent's new information.
    #[default]
    Explicit,
    /// One agent with an implicit total relation and a history of snapshots.
    /// Updates announce to the current model.
    Agent,
}

/// Settings shared by every session. All fields have defaults, so an empty
/// TOML table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Agent used when a description or query names none.
    pub default_agent: String,
    /// Agents event models relate worlds for.
    pub agents: Vec<String>,
    pub representation: Representation,
    /// Snapshots an agent session keeps for `Y` formulas.
    pub history_depth: usize,
    /// Drop worlds unreachable from the pointed world after explicit updates.
    pub prune_after_update: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_agent: "a".to_string(),
            agents: ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
            representation: Representation::Explicit,
            history_depth: 8,
            prune_after_update: true,
        }
    }
}
