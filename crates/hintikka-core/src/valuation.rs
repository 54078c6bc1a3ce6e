//! Truth assignments to atomic propositions.
//!
//! A valuation is closed-world: a proposition missing from the map is false.
//! Valuations built from a list of true names therefore only carry `true`
//! entries, while map-built valuations may carry explicit `false` entries.
//! Both read the same through [`Valuation::is_true`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A finite mapping from proposition name to truth value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Valuation {
    propositions: BTreeMap<String, bool>,
}

impl Valuation {
    /// Build from an explicit map, keeping `false` entries as given.
    pub fn from_map(propositions: BTreeMap<String, bool>) -> Self {
        Self { propositions }
    }

    /// Build from the list of propositions that are true.
    pub fn from_true<S: Into<String>>(true_props: impl IntoIterator<Item = S>) -> Self {
        Self {
            propositions: true_props.into_iter().map(|p| (p.into(), true)).collect(),
        }
    }

    /// Truth value of `proposition`; absent propositions are false.
    pub fn is_true(&self, proposition: &str) -> bool {
        self.propositions.get(proposition).copied().unwrap_or(false)
    }

    /// The explicit entry for `proposition`, if the valuation mentions it.
    pub fn get(&self, proposition: &str) -> Option<bool> {
        self.propositions.get(proposition).copied()
    }

    /// Clone-and-modify: a copy with `proposition` set to `value`.
    pub fn with(&self, proposition: impl Into<String>, value: bool) -> Self {
        let mut next = self.clone();
        next.propositions.insert(proposition.into(), value);
        next
    }

    pub(crate) fn set(&mut self, proposition: impl Into<String>, value: bool) {
        self.propositions.insert(proposition.into(), value);
    }

    /// Iterate explicit entries in proposition-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.propositions.iter().map(|(p, v)| (p.as_str(), *v))
    }

    /// Names of the explicitly mentioned propositions.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.propositions.keys().map(String::as_str)
    }

    /// The true propositions, sorted.
    pub fn true_propositions(&self) -> Vec<&str> {
        self.propositions
            .iter()
            .filter(|(_, v)| **v)
            .map(|(p, _)| p.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.propositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.propositions.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.propositions
    }

    /// Expand to a total assignment over `support`.
    ///
    /// Fails if the valuation mentions a proposition outside the support.
    pub fn to_assignment(&self, support: &[&str]) -> Result<BTreeMap<String, bool>, ModelError> {
        for p in self.propositions.keys() {
            if !support.contains(&p.as_str()) {
                return Err(ModelError::OutsideSupport {
                    proposition: p.clone(),
                    support: support.join(", "),
                });
            }
        }
        Ok(support
            .iter()
            .map(|p| (p.to_string(), self.is_true(p)))
            .collect())
    }
}

impl fmt::Display for Valuation {
    /// Sorted true propositions joined by commas.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.true_propositions().join(","))
    }
}
