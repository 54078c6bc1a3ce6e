//! Boundary to the external SAT solver that enumerates valuations.
//!
//! Formulas are rendered in the solver's text language (TouIST), with atom
//! names compacted to `p0, p1, ...` since the solver only accepts plain
//! identifiers. Each returned valuation seeds one world of a fresh agent
//! model.
//!
//! The solver itself is reached through [`ValuationSource`]. A source is a
//! single blocking request/response step; retries belong to the source.

use std::collections::{BTreeMap, VecDeque};

use hintikka_core::{
    AgentExplicitEpistemicModel, EpistemicModel, Formula, ModelError, ParseError, WorldValuation,
};
use tracing::{debug, warn};

use crate::error::{Result, SolverError};

/// Something that can list valuations satisfying a rendered formula.
pub trait ValuationSource {
    /// At most `count` satisfying valuations, each given as its true
    /// propositions. An unsatisfiable formula yields an empty list.
    fn fetch(
        &mut self,
        formula_text: &str,
        count: usize,
    ) -> std::result::Result<Vec<Vec<String>>, SolverError>;
}

/// Render the propositional part of `formula` in TouIST syntax.
///
/// Modal and temporal operators have no propositional rendering and are
/// rejected.
pub fn render_touist(formula: &Formula) -> std::result::Result<String, ParseError> {
    let mut out = String::new();
    write_touist(formula, &mut out)?;
    Ok(out)
}

fn write_touist(formula: &Formula, out: &mut String) -> std::result::Result<(), ParseError> {
    match formula {
        Formula::True => out.push_str("Top"),
        Formula::False => out.push_str("Bot"),
        Formula::Atomic(p) => out.push_str(p),
        Formula::Not(inner) => {
            out.push_str("not ");
            write_operand(inner, out)?;
        }
        Formula::And(fs) => write_joined(fs, "and", "Top", out)?,
        Formula::Or(fs) => write_joined(fs, "or", "Bot", out)?,
        Formula::Xor(fs) => match fs.as_slice() {
            [] => out.push_str("Bot"),
            [only] => write_touist(only, out)?,
            [a, b] => {
                write_operand(a, out)?;
                out.push_str(" xor ");
                write_operand(b, out)?;
            }
            _ => write_touist(&exactly_one(fs), out)?,
        },
        Formula::Imply(a, b) => {
            write_operand(a, out)?;
            out.push_str(" => ");
            write_operand(b, out)?;
        }
        Formula::Equiv(a, b) => {
            write_operand(a, out)?;
            out.push_str(" <=> ");
            write_operand(b, out)?;
        }
        Formula::Exactly { count, atoms } => {
            out.push_str(&format!("exact({count},[{}])", atoms.join(",")));
        }
        Formula::K { .. } | Formula::Kpos { .. } | Formula::Kw { .. } | Formula::Yesterday(_) => {
            return Err(ParseError::UnsupportedFormula(format!(
                "{formula} has no propositional rendering"
            )));
        }
    }
    Ok(())
}

fn write_operand(formula: &Formula, out: &mut String) -> std::result::Result<(), ParseError> {
    let atomic = matches!(
        formula,
        Formula::True | Formula::False | Formula::Atomic(_) | Formula::Exactly { .. }
    );
    if atomic {
        write_touist(formula, out)
    } else {
        out.push('(');
        write_touist(formula, out)?;
        out.push(')');
        Ok(())
    }
}

fn write_joined(
    operands: &[Formula],
    op: &str,
    empty: &str,
    out: &mut String,
) -> std::result::Result<(), ParseError> {
    match operands {
        [] => out.push_str(empty),
        [only] => write_touist(only, out)?,
        _ => {
            for (i, f) in operands.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                    out.push_str(op);
                    out.push(' ');
                }
                write_operand(f, out)?;
            }
        }
    }
    Ok(())
}

/// `(f1 or ... or fn) and not (fi and fj)` for every pair.
fn exactly_one(operands: &[Formula]) -> Formula {
    let mut conjuncts = vec![Formula::Or(operands.to_vec())];
    for (i, a) in operands.iter().enumerate() {
        for b in &operands[i + 1..] {
            conjuncts.push(Formula::And(vec![a.clone(), b.clone()]).negate());
        }
    }
    Formula::And(conjuncts)
}

/// Two-way map between proposition names and `p0, p1, ...`.
#[derive(Debug, Clone, Default)]
pub struct AtomCompaction {
    forward: BTreeMap<String, String>,
    backward: BTreeMap<String, String>,
}

impl AtomCompaction {
    /// Number the atoms of `formula` in sorted order.
    pub fn for_formula(formula: &Formula) -> Self {
        let mut compaction = Self::default();
        for atom in formula.atoms() {
            compaction.intern(atom);
        }
        compaction
    }

    fn intern(&mut self, name: &str) -> String {
        if let Some(short) = self.forward.get(name) {
            return short.clone();
        }
        let short = format!("p{}", self.forward.len());
        self.forward.insert(name.to_string(), short.clone());
        self.backward.insert(short.clone(), name.to_string());
        short
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// `formula` with every known atom replaced by its short name.
    pub fn compact(&self, formula: &Formula) -> Formula {
        formula.rename_atoms(|p| self.forward.get(p).cloned().unwrap_or_else(|| p.to_string()))
    }

    /// `formula` with short names replaced by the original ones.
    pub fn expand(&self, formula: &Formula) -> Formula {
        formula.rename_atoms(|p| self.backward.get(p).cloned().unwrap_or_else(|| p.to_string()))
    }

    pub fn short_name(&self, name: &str) -> Option<&str> {
        self.forward.get(name).map(String::as_str)
    }

    pub fn original_name(&self, short: &str) -> Option<&str> {
        self.backward.get(short).map(String::as_str)
    }

    /// Translate a solver valuation back into original names.
    pub fn expand_valuation(
        &self,
        true_props: &[String],
    ) -> std::result::Result<Vec<String>, SolverError> {
        true_props
            .iter()
            .map(|short| {
                self.original_name(short)
                    .map(str::to_string)
                    .ok_or_else(|| SolverError::Malformed(format!("unknown proposition {short}")))
            })
            .collect()
    }
}

/// Parse the solver's interactive output.
///
/// Each model is a block of `value name` lines terminated by a line starting
/// with `==`; a line starting with `unsat` ends the output. Only
/// propositions with value `1` are kept.
pub fn parse_touist_output(
    text: &str,
    count: usize,
) -> std::result::Result<Vec<Vec<String>>, SolverError> {
    let mut models = Vec::new();
    let mut current: Option<Vec<String>> = None;
    for line in text.lines().map(str::trim) {
        if models.len() == count || line.starts_with("unsat") {
            break;
        }
        let assignment = if line.starts_with("==") {
            if let Some(finished) = current.take() {
                models.push(finished);
            }
            // The prompt may share its line with the next model's first value.
            match line.split_once("(y/n)") {
                Some((_, rest)) => rest.trim(),
                None => continue,
            }
        } else {
            line
        };
        if assignment.is_empty() || models.len() == count {
            continue;
        }
        let mut parts = assignment.split_whitespace();
        let model = current.get_or_insert_with(Vec::new);
        match (parts.next(), parts.next(), parts.next()) {
            (Some("1"), Some(name), None) => model.push(name.to_string()),
            (Some("0"), Some(_), None) => {}
            _ => return Err(SolverError::Malformed(assignment.to_string())),
        }
    }
    if models.len() < count {
        if let Some(last) = current {
            models.push(last);
        }
    }
    Ok(models)
}

/// A source that replays canned valuations, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticValuations {
    queue: VecDeque<Vec<String>>,
    requests: Vec<String>,
}

impl StaticValuations {
    pub fn new<S: Into<String>>(valuations: impl IntoIterator<Item = Vec<S>>) -> Self {
        StaticValuations {
            queue: valuations
                .into_iter()
                .map(|v| v.into_iter().map(Into::into).collect())
                .collect(),
            requests: Vec::new(),
        }
    }

    /// Build from solver output text.
    pub fn from_touist_output(text: &str) -> std::result::Result<Self, SolverError> {
        Ok(Self::new(parse_touist_output(text, usize::MAX)?))
    }

    /// The formula texts that have been requested so far.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }
}

impl ValuationSource for StaticValuations {
    fn fetch(
        &mut self,
        formula_text: &str,
        count: usize,
    ) -> std::result::Result<Vec<Vec<String>>, SolverError> {
        self.requests.push(formula_text.to_string());
        let take = count.min(self.queue.len());
        Ok(self.queue.drain(..take).collect())
    }
}

/// Ask `source` for up to `count` valuations of `formula` and make each one
/// a world `w1, w2, ...` of a new model for `agent`.
pub fn seed_agent_model<S>(
    source: &mut S,
    formula: &Formula,
    count: usize,
    agent: &str,
) -> Result<AgentExplicitEpistemicModel>
where
    S: ValuationSource + ?Sized,
{
    let compaction = AtomCompaction::for_formula(formula);
    let text = render_touist(&compaction.compact(formula))?;
    let valuations = source.fetch(&text, count)?;
    if valuations.len() > count {
        warn!(asked = count, got = valuations.len(), "solver returned extra valuations");
    }

    let mut model = AgentExplicitEpistemicModel::new(agent);
    for (i, true_props) in valuations.iter().take(count).enumerate() {
        let names = compaction.expand_valuation(true_props)?;
        model.add_world(format!("w{}", i + 1), WorldValuation::from_true(names))?;
    }
    if model.world_count() == 0 {
        return Err(ModelError::NoSatisfyingWorld(formula.to_string()).into());
    }
    debug!(worlds = model.world_count(), atoms = compaction.len(), "seeded model from solver");
    Ok(model)
}
