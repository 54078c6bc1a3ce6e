//! `hintikka update`: tell the default agent a valuation.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Result};
use hintikka_session::{Session, SessionConfig, UpdateOutcome};
use serde::Serialize;

use super::{evaluate_all, load_session, print_json, print_results};

#[derive(Debug, Serialize)]
pub struct UpdateReport {
    pub outcome: UpdateOutcome,
    pub checks: Vec<(String, bool)>,
}

pub fn run(
    model: &Path,
    config: SessionConfig,
    facts: &[String],
    checks: &[String],
    json: bool,
) -> Result<()> {
    let mut session = load_session(model, config)?;
    let knowledge = parse_facts(facts)?;
    let report = update(&mut session, knowledge, checks)?;
    if json {
        print_json(&report)?;
    } else {
        print_outcome(&report.outcome);
        print_results(&report.checks);
    }
    if let Some(reason) = &report.outcome.reason {
        bail!("update failed: {reason}");
    }
    Ok(())
}

pub fn update(
    session: &mut Session,
    knowledge: BTreeMap<String, bool>,
    checks: &[String],
) -> Result<UpdateReport> {
    let outcome = session.update(knowledge)?;
    let checks = if outcome.success {
        evaluate_all(session, checks)?
    } else {
        Vec::new()
    };
    Ok(UpdateReport { outcome, checks })
}

/// `p`, `!p`, `~p`, `p=true` and `p=false`.
pub fn parse_facts(facts: &[String]) -> Result<BTreeMap<String, bool>> {
    let mut knowledge = BTreeMap::new();
    for fact in facts {
        let (prop, value) = match fact.split_once('=') {
            Some((prop, "true")) => (prop, true),
            Some((prop, "false")) => (prop, false),
            Some((_, other)) => bail!("`{fact}`: expected true or false, found `{other}`"),
            None => match fact.strip_prefix('!').or_else(|| fact.strip_prefix('~')) {
                Some(prop) => (prop, false),
                None => (fact.as_str(), true),
            },
        };
        if prop.is_empty() {
            bail!("`{fact}` names no proposition");
        }
        if let Some(previous) = knowledge.insert(prop.to_string(), value) {
            if previous != value {
                bail!("`{prop}` is given as both true and false");
            }
        }
    }
    Ok(knowledge)
}

pub fn print_outcome(outcome: &UpdateOutcome) {
    let summary = &outcome.summary;
    if outcome.success {
        println!("Update applied.");
    } else {
        println!(
            "Update failed: {}",
            outcome.reason.as_deref().unwrap_or("unknown reason")
        );
    }
    println!("  Worlds:  {}", summary.worlds);
    println!("  Edges:   {} ({} simulated)", summary.edges, summary.simulated_edges);
    println!("  Pointed: {}", summary.pointed.as_deref().unwrap_or("(none)"));
    if summary.history > 0 {
        println!("  History: {}", summary.history);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{write_model, CARDS};

    #[test]
    fn fact_syntax() {
        let facts: Vec<String> = ["p", "!q", "~r", "s=false", "t=true"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let k = parse_facts(&facts).unwrap();
        assert!(k["p"]);
        assert!(!k["q"]);
        assert!(!k["r"]);
        assert!(!k["s"]);
        assert!(k["t"]);

        assert!(parse_facts(&["p=maybe".to_string()]).is_err());
        assert!(parse_facts(&["!".to_string()]).is_err());
        assert!(parse_facts(&["p".to_string(), "!p".to_string()]).is_err());
    }

    #[test]
    fn update_then_check() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let mut session = load_session(&model, SessionConfig::default()).unwrap();
        let knowledge = parse_facts(&["p".to_string()]).unwrap();
        let report = update(&mut session, knowledge, &["(K a p)".to_string()]).unwrap();
        assert!(report.outcome.success);
        assert_eq!(report.outcome.summary.worlds, 2);
        assert_eq!(report.checks, vec![("(K a p)".to_string(), true)]);
    }

    #[test]
    fn failed_update_skips_checks() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let mut session = load_session(&model, SessionConfig::default()).unwrap();
        let knowledge = parse_facts(&["zzz".to_string()]).unwrap();
        let report = update(&mut session, knowledge, &["(K a p)".to_string()]).unwrap();
        assert!(!report.outcome.success);
        assert!(report.checks.is_empty());
    }
}
