//! One evolving model and the operations that drive it.

use std::collections::{BTreeMap, BTreeSet};

use hintikka_core::{
    create_update_formula, parse_formula, AgentExplicitEpistemicModel, EpistemicModel,
    ExplicitEpistemicModel, Formula, TemporalEpistemicModel, World, WorldValuation,
};
use hintikka_event::{
    AgentPublicAnnouncement, AgentTransitionEvent, EventModel, ExplicitEventModel,
    ExplicitFilterEventModel, Postcondition,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Representation, SessionConfig};
use crate::description::ModelDescription;
use crate::error::{Result, SessionError};
use crate::query::{evaluate_queries, Query};

/// The model a session currently answers queries from.
#[derive(Debug, Clone)]
pub enum CurrentModel {
    Explicit(ExplicitEpistemicModel),
    Agent(TemporalEpistemicModel),
}

impl CurrentModel {
    pub fn as_model(&self) -> &dyn EpistemicModel {
        match self {
            CurrentModel::Explicit(m) => m,
            CurrentModel::Agent(m) => m,
        }
    }

    pub fn representation(&self) -> Representation {
        match self {
            CurrentModel::Explicit(_) => Representation::Explicit,
            CurrentModel::Agent(_) => Representation::Agent,
        }
    }

    pub fn summary(&self) -> ModelSummary {
        let model = self.as_model();
        let (simulated_edges, history) = match self {
            CurrentModel::Explicit(m) => (m.edge_count(), 0),
            CurrentModel::Agent(m) => (m.current().simulated_edge_count(), m.history_len()),
        };
        ModelSummary {
            representation: self.representation(),
            worlds: model.world_count(),
            edges: model.edge_count(),
            simulated_edges,
            pointed: model.pointed_world().map(str::to_string),
            history,
        }
    }
}

/// Size statistics of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub representation: Representation,
    pub worlds: usize,
    /// Materialized edges.
    pub edges: usize,
    /// Edges an explicit model with the same relation would need.
    pub simulated_edges: usize,
    pub pointed: Option<String>,
    /// Earlier snapshots kept for `Y` formulas.
    pub history: usize,
}

/// The result of an update. A failed update leaves the session unchanged
/// and `summary` describes the model still in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub summary: ModelSummary,
}

/// Move every world satisfying `pre` to the initial-model world satisfying `post`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub pre: String,
    pub post: String,
}

impl TransitionSpec {
    pub fn new(pre: impl Into<String>, post: impl Into<String>) -> Self {
        Self {
            pre: pre.into(),
            post: post.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    config: SessionConfig,
    description: ModelDescription,
    initial: ExplicitEpistemicModel,
    current: CurrentModel,
    previous_knowledge: BTreeMap<String, bool>,
}

impl Session {
    /// Build the initial model of `description` in the configured representation.
    pub fn new(description: ModelDescription, config: SessionConfig) -> Result<Self> {
        let initial = description.build_explicit(&config.default_agent)?;
        let current = match config.representation {
            Representation::Explicit => CurrentModel::Explicit(initial.clone()),
            Representation::Agent => CurrentModel::Agent(TemporalEpistemicModel::new(
                description.build_agent(&config.default_agent)?,
            )),
        };
        let id = Uuid::new_v4();
        info!(
            session = %id,
            name = description.name(),
            representation = ?config.representation,
            worlds = initial.world_count(),
            "session started"
        );
        Ok(Self {
            id,
            config,
            description,
            initial,
            current,
            previous_knowledge: BTreeMap::new(),
        })
    }

    pub fn from_json(text: &str, config: SessionConfig) -> Result<Self> {
        Self::new(ModelDescription::from_json(text)?, config)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn description(&self) -> &ModelDescription {
        &self.description
    }

    /// The explicit model the description builds, before any update.
    pub fn initial_model(&self) -> &ExplicitEpistemicModel {
        &self.initial
    }

    pub fn current(&self) -> &CurrentModel {
        &self.current
    }

    pub fn model(&self) -> &dyn EpistemicModel {
        self.current.as_model()
    }

    /// The knowledge valuation of the last successful update.
    pub fn previous_knowledge(&self) -> &BTreeMap<String, bool> {
        &self.previous_knowledge
    }

    pub fn summary(&self) -> ModelSummary {
        self.current.summary()
    }

    /// Evaluate `formula` at the pointed world.
    pub fn check(&self, formula: &Formula) -> Result<bool> {
        Ok(self.model().check(formula)?)
    }

    pub fn check_text(&self, text: &str) -> Result<bool> {
        self.check(&parse_formula(text)?)
    }

    pub fn evaluate(&self, queries: &[Query]) -> Result<BTreeMap<u64, bool>> {
        evaluate_queries(self.model(), queries, &self.config.default_agent)
    }

    /// Whether `knowledge` keeps every value of the previous update.
    pub fn is_monotonic(&self, knowledge: &BTreeMap<String, bool>) -> bool {
        let monotonic = self
            .previous_knowledge
            .iter()
            .all(|(prop, value)| knowledge.get(prop) == Some(value));
        debug!(monotonic, "compared knowledge with previous update");
        monotonic
    }

    /// The default agent learns the literal valuation `knowledge`.
    ///
    /// An explicit session filters the initial model, so knowledge may be
    /// revised freely. An agent session announces to the current model and
    /// records the replaced one as yesterday.
    pub fn update(&mut self, knowledge: BTreeMap<String, bool>) -> Result<UpdateOutcome> {
        let formula = create_update_formula(&knowledge);
        let candidate = match &self.current {
            CurrentModel::Explicit(_) => {
                let filter =
                    ExplicitFilterEventModel::new_information(formula, &self.config.default_agent);
                filter
                    .and_then(|f| f.apply(&self.initial))
                    .map_err(SessionError::from)
                    .and_then(|next| self.pruned(next))
                    .map(CurrentModel::Explicit)
            }
            CurrentModel::Agent(model) => AgentPublicAnnouncement::new(formula)
                .apply(model.current())
                .map_err(SessionError::from)
                .map(|next| CurrentModel::Agent(self.advanced(model, next))),
        };
        let outcome = self.install(candidate, "knowledge update")?;
        if outcome.success {
            self.previous_knowledge = knowledge;
        }
        Ok(outcome)
    }

    /// Publicly announce `formula` to every agent of the model and the config.
    pub fn announce(&mut self, formula: &Formula) -> Result<UpdateOutcome> {
        let candidate = match &self.current {
            CurrentModel::Explicit(model) => {
                ExplicitEventModel::public_announcement(formula.clone(), self.event_agents(model))
                    .product(model)
                    .map_err(SessionError::from)
                    .and_then(|next| self.pruned(next))
                    .map(CurrentModel::Explicit)
            }
            CurrentModel::Agent(model) => AgentPublicAnnouncement::new(formula.clone())
                .apply(model.current())
                .map_err(SessionError::from)
                .map(|next| CurrentModel::Agent(self.advanced(model, next))),
        };
        self.install(candidate, "announcement")
    }

    pub fn announce_text(&mut self, text: &str) -> Result<UpdateOutcome> {
        let formula = parse_formula(text)?;
        self.announce(&formula)
    }

    /// Announce the formula of the description action named `name`.
    pub fn perform_action(&mut self, name: &str) -> Result<UpdateOutcome> {
        let formula = self.description.action_formula(name)?;
        self.announce(&formula)
    }

    /// Move worlds along `transitions`.
    ///
    /// Each `post` is resolved to a world of the initial model; when several
    /// match, the last one is taken. Transitions whose `post` matches nothing
    /// are skipped. Worlds matching no `pre` do not survive.
    pub fn transition(&mut self, transitions: &[TransitionSpec]) -> Result<UpdateOutcome> {
        let resolved = self.resolve_transitions(transitions);
        let candidate = match &self.current {
            CurrentModel::Explicit(model) => self
                .transition_event(resolved, self.event_agents(model))
                .and_then(|event| event.product(model).map_err(SessionError::from))
                .and_then(|next| self.pruned(next))
                .map(CurrentModel::Explicit),
            CurrentModel::Agent(model) => AgentTransitionEvent::new(resolved)
                .apply(model.current())
                .map_err(SessionError::from)
                .map(|next| CurrentModel::Agent(self.advanced(model, next))),
        };
        self.install(candidate, "transition")
    }

    fn resolve_transitions(&self, transitions: &[TransitionSpec]) -> Vec<(String, WorldValuation)> {
        let mut resolved = Vec::with_capacity(transitions.len());
        for spec in transitions {
            let target = self
                .initial
                .worlds()
                .filter(|(_, world)| world.model_check(&spec.post))
                .last();
            match target {
                Some((_, world)) => resolved.push((spec.pre.clone(), world.clone())),
                None => warn!(pre = %spec.pre, post = %spec.post, "no world matches transition target"),
            }
        }
        resolved
    }

    /// One event, possible wherever some guard holds, seen as itself by every agent.
    fn transition_event(
        &self,
        transitions: Vec<(String, WorldValuation)>,
        agents: Vec<String>,
    ) -> Result<ExplicitEventModel> {
        let guards: Vec<Formula> = transitions
            .iter()
            .map(|(guard, _)| Formula::atom(guard.clone()))
            .collect();
        let precondition = if guards.is_empty() {
            Formula::False
        } else {
            Formula::Or(guards)
        };
        let mut event = ExplicitEventModel::new(agents.clone());
        event.add_event("e", precondition, Postcondition::WorldTransfer(transitions))?;
        for agent in &agents {
            event.add_edge(agent, "e", "e")?;
        }
        event.set_pointed_event("e")?;
        Ok(event)
    }

    /// Agents an event must relate so no relation of `model` is lost.
    fn event_agents(&self, model: &ExplicitEpistemicModel) -> Vec<String> {
        let agents: BTreeSet<&String> = model.agents().iter().chain(&self.config.agents).collect();
        agents.into_iter().cloned().collect()
    }

    fn pruned(&self, mut model: ExplicitEpistemicModel) -> Result<ExplicitEpistemicModel> {
        if self.config.prune_after_update && model.pointed_world().is_some() {
            let removed = model.remove_unreachable_from_pointed()?;
            debug!(removed, "pruned unreachable worlds");
        }
        Ok(model)
    }

    fn advanced(
        &self,
        model: &TemporalEpistemicModel,
        next: AgentExplicitEpistemicModel,
    ) -> TemporalEpistemicModel {
        let mut advanced = model.clone().advance(next);
        advanced.truncate_history(self.config.history_depth);
        advanced
    }

    /// Swap in `candidate` if it was built. Update failures become an
    /// unsuccessful outcome; other errors propagate.
    fn install(&mut self, candidate: Result<CurrentModel>, what: &str) -> Result<UpdateOutcome> {
        match candidate {
            Ok(next) => {
                self.current = next;
                let summary = self.summary();
                info!(
                    session = %self.id,
                    update = what,
                    worlds = summary.worlds,
                    edges = summary.edges,
                    "model replaced"
                );
                Ok(UpdateOutcome {
                    success: true,
                    reason: None,
                    summary,
                })
            }
            Err(err @ (SessionError::Event(_) | SessionError::Model(_))) => {
                warn!(session = %self.id, update = what, error = %err, "update failed; model kept");
                Ok(UpdateOutcome {
                    success: false,
                    reason: Some(err.to_string()),
                    summary: self.summary(),
                })
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS: &str = r#"{
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

    fn knowledge(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
        pairs.iter().map(|(p, v)| (p.to_string(), *v)).collect()
    }

    fn agent_config() -> SessionConfig {
        SessionConfig {
            representation: Representation::Agent,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn explicit_update_filters_initial_model() {
        let mut s = Session::from_json(CARDS, SessionConfig::default()).unwrap();
        assert!(!s.check_text("(K a p)").unwrap());

        let out = s.update(knowledge(&[("p", true)])).unwrap();
        assert!(out.success);
        assert_eq!(out.summary.worlds, 2);
        assert!(s.check_text("(K a p)").unwrap());
        assert!(!s.check_text("(Kw a q)").unwrap());

        // Knowledge is revised against the initial model, not accumulated.
        let out = s.update(knowledge(&[("q", false)])).unwrap();
        assert!(out.success);
        assert!(s.check_text("(K a (not q))").unwrap());
        assert!(!s.check_text("(Kw a p)").unwrap());
        assert!(!s.is_monotonic(&knowledge(&[("p", true)])));
        assert!(s.is_monotonic(&knowledge(&[("q", false), ("p", true)])));
    }

    #[test]
    fn failed_update_keeps_model() {
        let mut s = Session::from_json(CARDS, SessionConfig::default()).unwrap();
        s.update(knowledge(&[("p", true)])).unwrap();
        let before = s.summary();

        let out = s.update(knowledge(&[("r", true)])).unwrap();
        assert!(!out.success);
        assert!(out.reason.is_some());
        assert_eq!(out.summary, before);
        assert_eq!(s.summary(), before);
        assert_eq!(s.previous_knowledge(), &knowledge(&[("p", true)]));
    }

    #[test]
    fn agent_update_accumulates_and_keeps_history() {
        let mut s = Session::from_json(CARDS, agent_config()).unwrap();
        assert_eq!(s.summary().simulated_edges, 16);

        assert!(s.update(knowledge(&[("p", true)])).unwrap().success);
        assert!(s.update(knowledge(&[("q", true)])).unwrap().success);
        let summary = s.summary();
        assert_eq!(summary.worlds, 1);
        assert_eq!(summary.edges, 0);
        assert_eq!(summary.history, 2);
        assert!(s.check_text("(K a (p and q))").unwrap());
        assert!(s.check_text("(Y (Kpos a (not q)))").unwrap());

        let out = s.update(knowledge(&[("p", false)])).unwrap();
        assert!(!out.success);
        assert_eq!(s.summary(), summary);
    }

    #[test]
    fn history_is_bounded() {
        let config = SessionConfig {
            history_depth: 1,
            ..agent_config()
        };
        let mut s = Session::from_json(CARDS, config).unwrap();
        for _ in 0..4 {
            assert!(s.update(knowledge(&[("p", true)])).unwrap().success);
        }
        assert_eq!(s.summary().history, 1);
    }

    #[test]
    fn announcement_reaches_every_agent() {
        let text = r#"{
            "initialModel": {
                "worlds": [{"name": "u", "props": ["p"]}, {"name": "v", "props": []}],
                "edges": [
                    {"agentName": "a", "worldOne": "u", "worldTwo": "v"},
                    {"agentName": "a", "worldOne": "v", "worldTwo": "u"},
                    {"agentName": "a", "worldOne": "u", "worldTwo": "u"},
                    {"agentName": "a", "worldOne": "v", "worldTwo": "v"},
                    {"agentName": "b", "worldOne": "u", "worldTwo": "v"},
                    {"agentName": "b", "worldOne": "u", "worldTwo": "u"}
                ]
            }
        }"#;
        let mut s = Session::from_json(text, SessionConfig::default()).unwrap();
        assert!(!s.check_text("(K b p)").unwrap());
        let out = s.announce_text("p").unwrap();
        assert!(out.success);
        assert_eq!(out.summary.pointed.as_deref(), Some("u_e"));
        assert!(s.check_text("(K a p)").unwrap());
        assert!(s.check_text("(K b p)").unwrap());

        let out = s.announce_text("(not p)").unwrap();
        assert!(!out.success);
        assert!(s.check_text("p").unwrap());
    }

    #[test]
    fn agents_outside_the_config_keep_their_relation() {
        let text = r#"{
            "initialModel": {
                "worlds": [{"name": "u", "props": ["p"]}, {"name": "v", "props": ["p", "q"]}],
                "edges": [
                    {"agentName": "x", "worldOne": "u", "worldTwo": "u"},
                    {"agentName": "x", "worldOne": "u", "worldTwo": "v"},
                    {"agentName": "x", "worldOne": "v", "worldTwo": "u"},
                    {"agentName": "x", "worldOne": "v", "worldTwo": "v"}
                ],
                "pointedWorld": "u"
            },
            "actions": [{"description": "say p", "formula": "p"}]
        }"#;
        let mut s = Session::from_json(text, SessionConfig::default()).unwrap();
        assert!(!s.check_text("(K x q)").unwrap());

        let out = s.announce_text("p").unwrap();
        assert!(out.success);
        assert_eq!(out.summary.worlds, 2);
        assert_eq!(out.summary.edges, 4);
        assert!(!s.check_text("(K x q)").unwrap());
        assert!(s.check_text("(Kpos x q)").unwrap());

        assert!(s.perform_action("say p").unwrap().success);
        assert_eq!(s.summary().worlds, 2);
        assert!(!s.check_text("(K x q)").unwrap());

        let out = s.transition(&[TransitionSpec::new("p", "q")]).unwrap();
        assert!(out.success);
        assert_eq!(out.summary.worlds, 2);
        assert!(s.check_text("(K x q)").unwrap());
        assert!(!s.check_text("(Kpos x (not p))").unwrap());
    }

    #[test]
    fn named_actions() {
        let mut s = Session::from_json(CARDS, SessionConfig::default()).unwrap();
        assert!(s.perform_action("show p").unwrap().success);
        assert!(s.check_text("(K a p)").unwrap());
        assert!(matches!(
            s.perform_action("shuffle"),
            Err(SessionError::Description(_))
        ));
    }

    #[test]
    fn parse_errors_propagate_before_mutation() {
        let mut s = Session::from_json(CARDS, SessionConfig::default()).unwrap();
        let before = s.summary();
        assert!(matches!(
            s.announce_text("(K a"),
            Err(SessionError::Parse(_))
        ));
        assert_eq!(s.summary(), before);
    }

    #[test]
    fn transitions_move_agent_worlds() {
        let text = r#"{
            "initialModel": {
                "worlds": [
                    {"name": "w1", "props": ["at_a"]},
                    {"name": "w2", "props": ["at_b"]},
                    {"name": "w3", "props": ["at_c"]}
                ]
            }
        }"#;
        let mut s = Session::from_json(text, agent_config()).unwrap();
        let out = s
            .transition(&[
                TransitionSpec::new("at_a", "at_b"),
                TransitionSpec::new("at_b", "at_c"),
                TransitionSpec::new("at_c", "at_z"),
            ])
            .unwrap();
        assert!(out.success);
        assert_eq!(out.summary.worlds, 2);
        assert!(s.check_text("(K a (not at_a))").unwrap());
        assert!(s.check_text("(Y (Kpos a at_c))").unwrap());
    }

    #[test]
    fn transitions_on_explicit_models() {
        let text = r#"{
            "initialModel": {
                "worlds": [
                    {"name": "w1", "props": ["at_a"]},
                    {"name": "w2", "props": ["at_b"]}
                ],
                "pointedWorld": "w1"
            }
        }"#;
        let mut s = Session::from_json(text, SessionConfig::default()).unwrap();
        let out = s.transition(&[TransitionSpec::new("at_a", "at_b")]).unwrap();
        assert!(out.success);
        assert_eq!(out.summary.pointed.as_deref(), Some("w1_e"));
        assert!(s.check_text("(K a at_b)").unwrap());

        let out = s.transition(&[TransitionSpec::new("at_c", "at_a")]).unwrap();
        assert!(!out.success);
        assert!(s.check_text("at_b").unwrap());
    }

    #[test]
    fn queries_use_default_agent() {
        let s = Session::from_json(CARDS, SessionConfig::default()).unwrap();
        let q = [Query::new(1, crate::query::Modality::Possible, "q")];
        assert!(s.evaluate(&q).unwrap()[&1]);
        assert_ne!(s.id(), Session::from_json(CARDS, SessionConfig::default()).unwrap().id());
    }
}
