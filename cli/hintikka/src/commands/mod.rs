//! CLI command implementations.

pub mod announce;
pub mod check;
pub mod contract;
pub mod inspect;
pub mod path;
pub mod update;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use hintikka_core::parse_formula;
use hintikka_session::{ModelDescription, Session, SessionConfig};
use serde::Serialize;

/// Read and validate a model description file.
pub fn load_description(path: &Path) -> Result<ModelDescription> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ModelDescription::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_session(path: &Path, config: SessionConfig) -> Result<Session> {
    let description = load_description(path)?;
    Session::new(description, config).with_context(|| format!("building model from {}", path.display()))
}

/// Evaluate each formula against the session, in order.
pub fn evaluate_all(session: &Session, formulas: &[String]) -> Result<Vec<(String, bool)>> {
    formulas
        .iter()
        .map(|text| {
            let formula = parse_formula(text).with_context(|| format!("parsing formula `{text}`"))?;
            let value = session
                .check(&formula)
                .with_context(|| format!("evaluating `{formula}`"))?;
            Ok((formula.to_string(), value))
        })
        .collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_results(results: &[(String, bool)]) {
    for (formula, value) in results {
        println!("  {value:<5}  {formula}");
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text + "\n").with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;

    pub const CARDS: &str = r#"{
        "name": "cards",
        "initialModel": {
            "worlds": [
                {"name": "w1", "props": ["p", "q"]},
                {"name": "w2", "props": ["p"]},
                {"name": "w3", "props": ["q"]},
                {"name": "w4", "props": []}
            ],
            "pointedWorld": "w1"
        },
        "actions": [{"description": "show p", "formula": "p"}]
    }"#;

    pub fn write_model(dir: &tempfile::TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("model.json");
        std::fs::write(&path, text).unwrap();
        path
    }
}
