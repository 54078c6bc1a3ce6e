//! `hintikka contract`: bisimulation contraction.

use std::path::Path;

use anyhow::{Context, Result};
use hintikka_core::{EpistemicModel, ExplicitEpistemicModel};
use hintikka_session::{ModelDescription, SessionConfig};
use serde::Serialize;

use super::{load_description, print_json, write_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractReport {
    pub agents: Vec<String>,
    pub worlds_before: usize,
    pub worlds_after: usize,
    pub edges_before: usize,
    pub edges_after: usize,
    pub model: ModelDescription,
}

pub fn run(
    model: &Path,
    config: &SessionConfig,
    agents: &[String],
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let description = load_description(model)?;
    let explicit = description
        .build_explicit(&config.default_agent)
        .with_context(|| format!("building model from {}", model.display()))?;
    let report = contract(&explicit, agents, description.name.clone())?;

    if let Some(path) = output {
        write_json(path, &report.model)?;
    }
    if json {
        return print_json(&report);
    }
    println!("Contracted for agents: {}", report.agents.join(", "));
    println!("  Worlds: {} -> {}", report.worlds_before, report.worlds_after);
    println!("  Edges:  {} -> {}", report.edges_before, report.edges_after);
    if let Some(path) = output {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Contract `model` for `agents`, or for all of its agents when none are given.
pub fn contract(
    model: &ExplicitEpistemicModel,
    agents: &[String],
    name: Option<String>,
) -> Result<ContractReport> {
    let agents = if agents.is_empty() {
        model.agents().to_vec()
    } else {
        agents.to_vec()
    };
    let contracted = model.contract(&agents)?;
    Ok(ContractReport {
        worlds_before: model.world_count(),
        worlds_after: contracted.world_count(),
        edges_before: model.edge_count(),
        edges_after: contracted.edge_count(),
        model: ModelDescription::from_model(name, &contracted),
        agents,
    })
}
