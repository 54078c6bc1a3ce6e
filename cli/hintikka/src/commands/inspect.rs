//! `hintikka inspect`: worlds, relations and statistics of a model.

use std::path::Path;

use anyhow::Result;
use hintikka_core::EpistemicModel;
use hintikka_session::{ModelSummary, Session, SessionConfig};
use serde::Serialize;

use super::{load_session, print_json};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub name: String,
    pub fingerprint: String,
    pub propositions: Vec<String>,
    pub worlds: Vec<WorldLine>,
    pub relations: Vec<RelationLine>,
    pub actions: Vec<String>,
    pub summary: ModelSummary,
}

#[derive(Debug, Serialize)]
pub struct WorldLine {
    pub id: String,
    pub valuation: String,
    pub pointed: bool,
}

#[derive(Debug, Serialize)]
pub struct RelationLine {
    pub agent: String,
    pub edges: usize,
    pub reflexive: bool,
}

pub fn run(model: &Path, config: &SessionConfig, json: bool) -> Result<()> {
    let session = load_session(model, config.clone())?;
    let report = inspect(&session)?;
    if json {
        return print_json(&report);
    }

    println!("Model: {}", report.name);
    println!("  Fingerprint:  {}", &report.fingerprint[..12]);
    println!("  Propositions: {}", report.propositions.join(", "));
    println!();
    println!("Worlds ({}):", report.worlds.len());
    for world in &report.worlds {
        let marker = if world.pointed { "*" } else { " " };
        println!(" {marker} {:<12} {{{}}}", world.id, world.valuation);
    }
    if !report.relations.is_empty() {
        println!();
        println!("Relations:");
        for relation in &report.relations {
            let reflexive = if relation.reflexive { ", reflexive" } else { "" };
            println!("  {}: {} edges{reflexive}", relation.agent, relation.edges);
        }
    }
    if !report.actions.is_empty() {
        println!();
        println!("Actions:");
        for action in &report.actions {
            println!("  {action}");
        }
    }
    println!();
    println!(
        "Summary: {} worlds, {} edges ({} simulated), {:?} representation",
        report.summary.worlds,
        report.summary.edges,
        report.summary.simulated_edges,
        report.summary.representation
    );
    Ok(())
}

/// Describe the initial model of `session`.
pub fn inspect(session: &Session) -> Result<InspectReport> {
    let description = session.description();
    let model = session.initial_model();
    let pointed = model.pointed_world();

    let worlds = model
        .worlds()
        .map(|(id, world)| WorldLine {
            id: id.to_string(),
            valuation: world.to_string(),
            pointed: Some(id) == pointed,
        })
        .collect();

    let graph = model.graph();
    let relations = graph
        .agents()
        .map(|agent| RelationLine {
            agent: agent.to_string(),
            edges: graph.edges().filter(|(a, _, _)| *a == agent).count(),
            reflexive: graph.is_reflexive(agent),
        })
        .collect();

    Ok(InspectReport {
        name: description.name().to_string(),
        fingerprint: description.fingerprint()?.to_string(),
        propositions: description.propositions(),
        worlds,
        relations,
        actions: description
            .actions
            .iter()
            .map(|a| format!("{}: {}", a.description, a.formula))
            .collect(),
        summary: session.summary(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{write_model, CARDS};

    #[test]
    fn reports_worlds_and_relations() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_model(&dir, CARDS);
        let session = load_session(&path, SessionConfig::default()).unwrap();
        let report = inspect(&session).unwrap();

        assert_eq!(report.name, "cards");
        assert_eq!(report.fingerprint.len(), 64);
        assert_eq!(report.propositions, ["p", "q"]);
        assert_eq!(report.worlds.len(), 4);
        assert_eq!(report.worlds[0].valuation, "p,q");
        assert!(report.worlds[0].pointed);
        assert!(!report.worlds[1].pointed);
        assert_eq!(report.relations.len(), 1);
        assert_eq!(report.relations[0].edges, 16);
        assert!(report.relations[0].reflexive);
        assert_eq!(report.actions, ["show p: p"]);
        assert_eq!(report.summary.worlds, 4);
    }
}
