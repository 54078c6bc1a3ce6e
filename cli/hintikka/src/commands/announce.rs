//! `hintikka announce`: run public announcements in sequence.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hintikka_core::parse_formula;
use hintikka_session::{CurrentModel, ModelDescription, Session, SessionConfig, UpdateOutcome};
use serde::Serialize;

use super::update::print_outcome;
use super::{evaluate_all, load_session, print_json, print_results, write_json};

/// What to announce, in order: named actions first, then formulas.
pub struct Steps<'a> {
    pub actions: &'a [String],
    pub formulas: &'a [String],
    pub checks: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct AnnounceReport {
    pub steps: Vec<(String, UpdateOutcome)>,
    pub checks: Vec<(String, bool)>,
}

impl AnnounceReport {
    pub fn failed(&self) -> Option<&(String, UpdateOutcome)> {
        self.steps.iter().find(|(_, outcome)| !outcome.success)
    }
}

pub fn run(
    model: &Path,
    config: SessionConfig,
    steps: &Steps<'_>,
    export: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut session = load_session(model, config)?;
    let report = announce(&mut session, steps)?;
    if json {
        print_json(&report)?;
    } else {
        for (step, outcome) in &report.steps {
            println!("{step}");
            print_outcome(outcome);
        }
        print_results(&report.checks);
    }
    if let Some((step, outcome)) = report.failed() {
        bail!(
            "announcing {step} failed: {}",
            outcome.reason.as_deref().unwrap_or("unknown reason")
        );
    }
    if let Some(path) = export {
        export_model(&session, path)?;
        if !json {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Apply every step, stopping at the first one that fails.
pub fn announce(session: &mut Session, steps: &Steps<'_>) -> Result<AnnounceReport> {
    let mut done = Vec::new();
    for name in steps.actions {
        let outcome = session.perform_action(name)?;
        let failed = !outcome.success;
        done.push((format!("action `{name}`"), outcome));
        if failed {
            return Ok(AnnounceReport {
                steps: done,
                checks: Vec::new(),
            });
        }
    }
    for text in steps.formulas {
        let formula = parse_formula(text).with_context(|| format!("parsing formula `{text}`"))?;
        let outcome = session.announce(&formula)?;
        let failed = !outcome.success;
        done.push((formula.to_string(), outcome));
        if failed {
            return Ok(AnnounceReport {
                steps: done,
                checks: Vec::new(),
            });
        }
    }
    let checks = evaluate_all(session, steps.checks)?;
    Ok(AnnounceReport { steps: done, checks })
}

fn export_model(session: &Session, path: &Path) -> Result<()> {
    let explicit = match session.current() {
        CurrentModel::Explicit(model) => model.clone(),
        CurrentModel::Agent(model) => model.current().to_explicit()?,
    };
    let name = format!("{} (updated)", session.description().name());
    write_json(path, &ModelDescription::from_model(Some(name), &explicit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{write_model, CARDS};
    use crate::commands::load_description;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn actions_then_formulas_then_checks() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let mut session = load_session(&model, SessionConfig::default()).unwrap();
        let actions = strings(&["show p"]);
        let formulas = strings(&["q"]);
        let checks = strings(&["(K a (p and q))"]);
        let report = announce(
            &mut session,
            &Steps {
                actions: &actions,
                formulas: &formulas,
                checks: &checks,
            },
        )
        .unwrap();
        assert_eq!(report.steps.len(), 2);
        assert!(report.failed().is_none());
        assert_eq!(report.checks, vec![("(K a (p and q))".to_string(), true)]);
    }

    #[test]
    fn stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let mut session = load_session(&model, SessionConfig::default()).unwrap();
        let formulas = strings(&["(not p)", "q"]);
        let report = announce(
            &mut session,
            &Steps {
                actions: &[],
                formulas: &formulas,
                checks: &[],
            },
        )
        .unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.failed().map(|(s, _)| s.as_str()), Some("(not p)"));
    }

    #[test]
    fn export_writes_a_loadable_description() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let mut session = load_session(&model, SessionConfig::default()).unwrap();
        session.announce_text("p").unwrap();

        let out = dir.path().join("after.json");
        export_model(&session, &out).unwrap();
        let reloaded = load_description(&out).unwrap();
        assert_eq!(reloaded.name(), "cards (updated)");
        assert_eq!(reloaded.initial_model.worlds.len(), 2);
    }
}
