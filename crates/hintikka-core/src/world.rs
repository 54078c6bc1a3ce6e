//! World contents.
//!
//! A world owns no edges; relations live in the enclosing graph. Worlds are
//! plain values, so a model update always produces fresh copies instead of
//! sharing content with the model it was derived from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::valuation::Valuation;

/// Content of a possible world: answers whether an atomic proposition holds.
pub trait World: Clone + fmt::Debug + fmt::Display {
    /// Whether `proposition` is true in this world.
    fn model_check(&self, proposition: &str) -> bool;
}

/// A world described entirely by its valuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldValuation {
    pub valuation: Valuation,
}

impl WorldValuation {
    pub fn new(valuation: Valuation) -> Self {
        Self { valuation }
    }

    /// Shorthand for a world whose true propositions are `props`.
    pub fn from_true<S: Into<String>>(props: impl IntoIterator<Item = S>) -> Self {
        Self::new(Valuation::from_true(props))
    }

    /// A copy of this world with `proposition` reassigned.
    pub fn assign(&self, proposition: impl Into<String>, value: bool) -> Self {
        let mut next = self.clone();
        next.valuation.set(proposition, value);
        next
    }
}

impl World for WorldValuation {
    fn model_check(&self, proposition: &str) -> bool {
        self.valuation.is_true(proposition)
    }
}

impl fmt::Display for WorldValuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.valuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_check_reads_valuation() {
        let w = WorldValuation::from_true(["p"]);
        assert!(w.model_check("p"));
        assert!(!w.model_check("q"));
    }

    #[test]
    fn assign_leaves_source_untouched() {
        let w = WorldValuation::from_true(["p"]);
        let w2 = w.assign("p", false);
        assert!(w.model_check("p"));
        assert!(!w2.model_check("p"));
    }
}
