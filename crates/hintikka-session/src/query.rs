//! Knowledge queries in the object form clients send.
//!
//! A query asks whether an agent knows (or considers possible) a literal:
//!
//! ```json
//! {"id": 3, "agent": "a", "modality": "knows", "prop": "heads", "propNegated": true}
//! ```
//!
//! which reads `K a (not heads)`.

use std::collections::BTreeMap;

use hintikka_core::{EpistemicModel, Formula, ParseError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    Knows,
    Possible,
}

impl Modality {
    /// Accepts `knows`, `know`, `k` and `possible`.
    pub fn parse(text: &str) -> std::result::Result<Self, ParseError> {
        match text {
            "knows" | "know" | "k" => Ok(Modality::Knows),
            "possible" => Ok(Modality::Possible),
            other => Err(ParseError::UnsupportedFormula(format!("modality {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub modality: String,
    #[serde(default)]
    pub modality_negated: bool,
    pub prop: String,
    #[serde(default)]
    pub prop_negated: bool,
}

impl Query {
    pub fn new(id: u64, modality: Modality, prop: impl Into<String>) -> Self {
        Query {
            id,
            agent: None,
            modality: match modality {
                Modality::Knows => "knows".into(),
                Modality::Possible => "possible".into(),
            },
            modality_negated: false,
            prop: prop.into(),
            prop_negated: false,
        }
    }

    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn negate_modality(mut self) -> Self {
        self.modality_negated = !self.modality_negated;
        self
    }

    pub fn negate_prop(mut self) -> Self {
        self.prop_negated = !self.prop_negated;
        self
    }

    /// The formula this query asks about. `default_agent` fills in a
    /// missing agent.
    pub fn to_formula(&self, default_agent: &str) -> std::result::Result<Formula, ParseError> {
        let agent = self.agent.as_deref().unwrap_or(default_agent);
        let mut inner = Formula::atom(self.prop.clone());
        if self.prop_negated {
            inner = inner.negate();
        }
        let modal = match Modality::parse(&self.modality)? {
            Modality::Knows => Formula::k(agent, inner),
            Modality::Possible => Formula::kpos(agent, inner),
        };
        Ok(if self.modality_negated {
            modal.negate()
        } else {
            modal
        })
    }
}

/// Evaluate every query at the pointed world of `model`.
///
/// A query that fails to parse fails the whole batch before anything is
/// evaluated. Repeated ids are logged and the later answer wins.
pub fn evaluate_queries<M>(
    model: &M,
    queries: &[Query],
    default_agent: &str,
) -> Result<BTreeMap<u64, bool>>
where
    M: EpistemicModel + ?Sized,
{
    let formulas = queries
        .iter()
        .map(|q| q.to_formula(default_agent).map(|f| (q.id, f)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut results = BTreeMap::new();
    for (id, formula) in &formulas {
        let value = model.check(formula)?;
        if results.insert(*id, value).is_some() {
            warn!(id, formula = %formula, "query id evaluated twice");
        }
    }
    debug!(queries = formulas.len(), "evaluated queries");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use hintikka_core::{ExplicitEpistemicModel, WorldValuation};

    use super::*;
    use crate::error::SessionError;

    fn coin() -> ExplicitEpistemicModel {
        let mut m = ExplicitEpistemicModel::new(["a"]);
        m.add_world("w1", WorldValuation::from_true(["heads"])).unwrap();
        m.add_world("w2", WorldValuation::default()).unwrap();
        m.bulk_add_edges("a");
        m.set_pointed_world("w1").unwrap();
        m
    }

    #[test]
    fn query_json_shape() {
        let q: Query = serde_json::from_str(
            r#"{"id": 3, "modality": "k", "prop": "heads", "propNegated": true}"#,
        )
        .unwrap();
        assert_eq!(q.to_formula("a").unwrap().to_string(), "(K a (not heads))");

        let q: Query = serde_json::from_str(
            r#"{"id": 4, "agent": "b", "modality": "possible", "modalityNegated": true, "prop": "p"}"#,
        )
        .unwrap();
        assert_eq!(q.to_formula("a").unwrap().to_string(), "(not (Kpos b p))");
    }

    #[test]
    fn unknown_modality_is_unsupported() {
        let q = Query {
            modality: "believes".into(),
            ..Query::new(1, Modality::Knows, "p")
        };
        assert!(matches!(
            q.to_formula("a"),
            Err(ParseError::UnsupportedFormula(_))
        ));
        let err = evaluate_queries(&coin(), &[q], "a").unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
    }

    #[test]
    fn evaluates_against_pointed_world() {
        let queries = [
            Query::new(1, Modality::Knows, "heads"),
            Query::new(2, Modality::Possible, "heads"),
            Query::new(3, Modality::Possible, "heads").negate_prop(),
            Query::new(4, Modality::Knows, "heads").negate_modality(),
        ];
        let results = evaluate_queries(&coin(), &queries, "a").unwrap();
        assert!(!results[&1]);
        assert!(results[&2]);
        assert!(results[&3]);
        assert!(results[&4]);
    }

    #[test]
    fn later_duplicate_wins() {
        let queries = [
            Query::new(7, Modality::Knows, "heads"),
            Query::new(7, Modality::Possible, "heads"),
        ];
        let results = evaluate_queries(&coin(), &queries, "a").unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[&7]);
    }

    #[test]
    fn modality_spellings() {
        for text in ["knows", "know", "k"] {
            assert_eq!(Modality::parse(text).unwrap(), Modality::Knows);
        }
        assert_eq!(Modality::parse("possible").unwrap(), Modality::Possible);
        assert!(matches!(
            Modality::parse("believes"),
            Err(ParseError::UnsupportedFormula(_))
        ));

        let q: Query =
            serde_json::from_str(r#"{"id": 1, "modality": "k", "prop": "heads"}"#).unwrap();
        assert!(!evaluate_queries(&coin(), &[q], "a").unwrap()[&1]);
    }
}
