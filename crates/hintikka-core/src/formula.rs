//! The closed set of propositional, modal, and temporal formulas.
//!
//! Formulas are immutable value trees: a parent owns its children and no
//! node refers back up the tree. Every consumer matches on [`Formula`]
//! exhaustively, so adding a variant forces every evaluator to handle it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::valuation::Valuation;

/// A formula of epistemic logic with a yesterday operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    /// Always true (`top`).
    True,
    /// Always false (`bottom`).
    False,
    /// An atomic proposition, checked against the world's valuation.
    Atomic(String),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction over a non-empty ordered list.
    And(Vec<Formula>),
    /// Disjunction over a non-empty ordered list.
    Or(Vec<Formula>),
    /// Exactly one operand holds.
    Xor(Vec<Formula>),
    /// Material implication.
    Imply(Box<Formula>, Box<Formula>),
    /// Material equivalence.
    Equiv(Box<Formula>, Box<Formula>),
    /// `agent` knows the formula: it holds in every accessible world.
    K { agent: String, formula: Box<Formula> },
    /// `agent` considers the formula possible: it holds in some accessible world.
    Kpos { agent: String, formula: Box<Formula> },
    /// `agent` knows whether the formula holds: it is uniform across accessible worlds.
    Kw { agent: String, formula: Box<Formula> },
    /// Exactly `count` of the listed propositions are true in the world.
    Exactly { count: usize, atoms: Vec<String> },
    /// The formula held at the pointed world of the previous snapshot.
    Yesterday(Box<Formula>),
}

impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Formula::Atomic(name.into())
    }

    /// Wrap this formula in a negation.
    pub fn negate(self) -> Self {
        Formula::Not(Box::new(self))
    }

    /// Conjunction; an empty operand list is rejected rather than read as `True`.
    pub fn and(operands: Vec<Formula>) -> Result<Self, ParseError> {
        if operands.is_empty() {
            return Err(ParseError::EmptyConnective("and"));
        }
        Ok(Formula::And(operands))
    }

    pub fn or(operands: Vec<Formula>) -> Result<Self, ParseError> {
        if operands.is_empty() {
            return Err(ParseError::EmptyConnective("or"));
        }
        Ok(Formula::Or(operands))
    }

    pub fn xor(operands: Vec<Formula>) -> Result<Self, ParseError> {
        if operands.is_empty() {
            return Err(ParseError::EmptyConnective("xor"));
        }
        Ok(Formula::Xor(operands))
    }

    pub fn imply(antecedent: Formula, consequent: Formula) -> Self {
        Formula::Imply(Box::new(antecedent), Box::new(consequent))
    }

    pub fn equiv(left: Formula, right: Formula) -> Self {
        Formula::Equiv(Box::new(left), Box::new(right))
    }

    pub fn k(agent: impl Into<String>, formula: Formula) -> Self {
        Formula::K {
            agent: agent.into(),
            formula: Box::new(formula),
        }
    }

    pub fn kpos(agent: impl Into<String>, formula: Formula) -> Self {
        Formula::Kpos {
            agent: agent.into(),
            formula: Box::new(formula),
        }
    }

    pub fn kw(agent: impl Into<String>, formula: Formula) -> Self {
        Formula::Kw {
            agent: agent.into(),
            formula: Box::new(formula),
        }
    }

    pub fn exactly<S: Into<String>>(count: usize, atoms: impl IntoIterator<Item = S>) -> Self {
        Formula::Exactly {
            count,
            atoms: atoms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn yesterday(formula: Formula) -> Self {
        Formula::Yesterday(Box::new(formula))
    }

    /// True when no `And`/`Or`/`Xor` anywhere in the tree is empty.
    pub fn is_well_formed(&self) -> bool {
        match self {
            Formula::True | Formula::False | Formula::Atomic(_) | Formula::Exactly { .. } => true,
            Formula::Not(f) | Formula::Yesterday(f) => f.is_well_formed(),
            Formula::And(fs) | Formula::Or(fs) | Formula::Xor(fs) => {
                !fs.is_empty() && fs.iter().all(Formula::is_well_formed)
            }
            Formula::Imply(a, b) | Formula::Equiv(a, b) => a.is_well_formed() && b.is_well_formed(),
            Formula::K { formula, .. }
            | Formula::Kpos { formula, .. }
            | Formula::Kw { formula, .. } => formula.is_well_formed(),
        }
    }

    /// True when the formula contains no modal or temporal operator.
    pub fn is_propositional(&self) -> bool {
        match self {
            Formula::True | Formula::False | Formula::Atomic(_) | Formula::Exactly { .. } => true,
            Formula::Not(f) => f.is_propositional(),
            Formula::And(fs) | Formula::Or(fs) | Formula::Xor(fs) => {
                fs.iter().all(Formula::is_propositional)
            }
            Formula::Imply(a, b) | Formula::Equiv(a, b) => {
                a.is_propositional() && b.is_propositional()
            }
            Formula::K { .. } | Formula::Kpos { .. } | Formula::Kw { .. } | Formula::Yesterday(_) => {
                false
            }
        }
    }

    /// Every proposition name mentioned by the formula.
    pub fn atoms(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Atomic(p) => {
                out.insert(p.as_str());
            }
            Formula::Exactly { atoms, .. } => out.extend(atoms.iter().map(String::as_str)),
            Formula::Not(f) | Formula::Yesterday(f) => f.collect_atoms(out),
            Formula::And(fs) | Formula::Or(fs) | Formula::Xor(fs) => {
                for f in fs {
                    f.collect_atoms(out);
                }
            }
            Formula::Imply(a, b) | Formula::Equiv(a, b) => {
                a.collect_atoms(out);
                b.collect_atoms(out);
            }
            Formula::K { formula, .. }
            | Formula::Kpos { formula, .. }
            | Formula::Kw { formula, .. } => formula.collect_atoms(out),
        }
    }

    /// Every agent label mentioned by a modality in the formula.
    pub fn agents(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_agents(&mut out);
        out
    }

    fn collect_agents<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Formula::True | Formula::False | Formula::Atomic(_) | Formula::Exactly { .. } => {}
            Formula::Not(f) | Formula::Yesterday(f) => f.collect_agents(out),
            Formula::And(fs) | Formula::Or(fs) | Formula::Xor(fs) => {
                for f in fs {
                    f.collect_agents(out);
                }
            }
            Formula::Imply(a, b) | Formula::Equiv(a, b) => {
                a.collect_agents(out);
                b.collect_agents(out);
            }
            Formula::K { agent, formula }
            | Formula::Kpos { agent, formula }
            | Formula::Kw { agent, formula } => {
                out.insert(agent.as_str());
                formula.collect_agents(out);
            }
        }
    }

    /// Rebuild the formula with every proposition name passed through `rename`.
    ///
    /// The shape is preserved exactly; agent labels are left alone. The
    /// proposition lists of `Exactly` are renamed too, since they name atoms.
    pub fn rename_atoms<F>(&self, mut rename: F) -> Formula
    where
        F: FnMut(&str) -> String,
    {
        self.rename_with(&mut rename)
    }

    fn rename_with(&self, rename: &mut dyn FnMut(&str) -> String) -> Formula {
        match self {
            Formula::True => Formula::True,
            Formula::False => Formula::False,
            Formula::Atomic(p) => Formula::Atomic(rename(p)),
            Formula::Exactly { count, atoms } => Formula::Exactly {
                count: *count,
                atoms: atoms.iter().map(|p| rename(p)).collect(),
            },
            Formula::Not(f) => Formula::Not(Box::new(f.rename_with(rename))),
            Formula::Yesterday(f) => Formula::Yesterday(Box::new(f.rename_with(rename))),
            Formula::And(fs) => Formula::And(fs.iter().map(|f| f.rename_with(rename)).collect()),
            Formula::Or(fs) => Formula::Or(fs.iter().map(|f| f.rename_with(rename)).collect()),
            Formula::Xor(fs) => Formula::Xor(fs.iter().map(|f| f.rename_with(rename)).collect()),
            Formula::Imply(a, b) => Formula::Imply(
                Box::new(a.rename_with(rename)),
                Box::new(b.rename_with(rename)),
            ),
            Formula::Equiv(a, b) => Formula::Equiv(
                Box::new(a.rename_with(rename)),
                Box::new(b.rename_with(rename)),
            ),
            Formula::K { agent, formula } => Formula::K {
                agent: agent.clone(),
                formula: Box::new(formula.rename_with(rename)),
            },
            Formula::Kpos { agent, formula } => Formula::Kpos {
                agent: agent.clone(),
                formula: Box::new(formula.rename_with(rename)),
            },
            Formula::Kw { agent, formula } => Formula::Kw {
                agent: agent.clone(),
                formula: Box::new(formula.rename_with(rename)),
            },
        }
    }
}

/// Build `And(True, l1, l2, ...)` with one literal per entry, negated when
/// the entry is false. The leading `True` keeps the conjunction non-empty.
pub fn create_update_formula(prop_values: &BTreeMap<String, bool>) -> Formula {
    let mut conjuncts = Vec::with_capacity(prop_values.len() + 1);
    conjuncts.push(Formula::True);
    for (prop, value) in prop_values {
        let literal = Formula::atom(prop.clone());
        conjuncts.push(if *value { literal } else { literal.negate() });
    }
    Formula::And(conjuncts)
}

/// One literal per proposition present in the valuation, or `[True]` when
/// the valuation is empty.
pub fn valuation_atomic_formulas(valuation: &Valuation) -> Vec<Formula> {
    if valuation.is_empty() {
        return vec![Formula::True];
    }
    valuation
        .iter()
        .map(|(prop, value)| {
            let literal = Formula::atom(prop);
            if value {
                literal
            } else {
                literal.negate()
            }
        })
        .collect()
}

fn write_group(f: &mut fmt::Formatter<'_>, op: &str, operands: &[Formula]) -> fmt::Result {
    if let [only] = operands {
        return write!(f, "{only}");
    }
    write!(f, "(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{operand}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "top"),
            Formula::False => write!(f, "bottom"),
            Formula::Atomic(p) => write!(f, "{p}"),
            Formula::Not(inner) => write!(f, "(not {inner})"),
            Formula::And(fs) => write_group(f, "and", fs),
            Formula::Or(fs) => write_group(f, "or", fs),
            Formula::Xor(fs) => write_group(f, "xor", fs),
            Formula::Imply(a, b) => write!(f, "({a} imply {b})"),
            Formula::Equiv(a, b) => write!(f, "({a} equiv {b})"),
            Formula::K { agent, formula } => write!(f, "(K {agent} {formula})"),
            Formula::Kpos { agent, formula } => write!(f, "(Kpos {agent} {formula})"),
            Formula::Kw { agent, formula } => write!(f, "(Kw {agent} {formula})"),
            Formula::Exactly { count, atoms } => {
                write!(f, "(exactly {count}")?;
                for atom in atoms {
                    write!(f, " {atom}")?;
                }
                write!(f, ")")
            }
            Formula::Yesterday(inner) => write!(f, "(Y {inner})"),
        }
    }
}
