//! `hintikka check`: evaluate formulas and query objects.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hintikka_session::{Query, Session, SessionConfig};
use serde::Serialize;

use super::{evaluate_all, load_session, print_json, print_results};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub pointed: Option<String>,
    pub formulas: Vec<(String, bool)>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub queries: BTreeMap<u64, bool>,
}

pub fn run(
    model: &Path,
    config: SessionConfig,
    formulas: &[String],
    queries: Option<&Path>,
    json: bool,
) -> Result<()> {
    let session = load_session(model, config)?;
    let report = check(&session, formulas, queries)?;
    if json {
        return print_json(&report);
    }
    println!(
        "Pointed world: {}",
        report.pointed.as_deref().unwrap_or("(none)")
    );
    print_results(&report.formulas);
    for (id, value) in &report.queries {
        println!("  {value:<5}  query {id}");
    }
    Ok(())
}

pub fn check(session: &Session, formulas: &[String], queries: Option<&Path>) -> Result<CheckReport> {
    let results = evaluate_all(session, formulas)?;
    let queries = match queries {
        Some(path) => {
            let text =
                fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            let parsed: Vec<Query> =
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
            session.evaluate(&parsed)?
        }
        None => BTreeMap::new(),
    };
    Ok(CheckReport {
        pointed: session.summary().pointed,
        formulas: results,
        queries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{write_model, CARDS};

    #[test]
    fn formulas_and_queries() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let queries = dir.path().join("queries.json");
        fs::write(
            &queries,
            r#"[{"id": 1, "modality": "knows", "prop": "p"},
                {"id": 2, "modality": "possible", "prop": "p", "propNegated": true}]"#,
        )
        .unwrap();

        let session = load_session(&model, SessionConfig::default()).unwrap();
        let report = check(
            &session,
            &["(Kpos a q)".to_string(), "(p and q)".to_string()],
            Some(&queries),
        )
        .unwrap();
        assert_eq!(report.pointed.as_deref(), Some("w1"));
        assert_eq!(
            report.formulas,
            vec![
                ("(Kpos a q)".to_string(), true),
                ("(p and q)".to_string(), true)
            ]
        );
        assert!(!report.queries[&1]);
        assert!(report.queries[&2]);
    }

    #[test]
    fn bad_formula_names_itself() {
        let dir = tempfile::tempdir().unwrap();
        let model = write_model(&dir, CARDS);
        let session = load_session(&model, SessionConfig::default()).unwrap();
        let err = check(&session, &["(K a".to_string()], None).unwrap_err();
        assert!(format!("{err:#}").contains("(K a"));
    }
}
