//! Agent models with a chain of earlier snapshots.

use crate::error::ModelError;
use crate::graph::Successors;
use crate::model::agent::AgentExplicitEpistemicModel;
use crate::model::EpistemicModel;
use crate::world::WorldValuation;

/// The current single-agent model plus the model it replaced.
///
/// `Yesterday(f)` is evaluated at the pointed world of the previous snapshot.
#[derive(Debug, Clone)]
pub struct TemporalEpistemicModel {
    current: AgentExplicitEpistemicModel,
    yesterday: Option<Box<TemporalEpistemicModel>>,
}

impl TemporalEpistemicModel {
    /// A model with no history.
    pub fn new(current: AgentExplicitEpistemicModel) -> Self {
        Self {
            current,
            yesterday: None,
        }
    }

    /// Install `next` as the current model; `self` becomes its yesterday.
    pub fn advance(self, next: AgentExplicitEpistemicModel) -> Self {
        Self {
            current: next,
            yesterday: Some(Box::new(self)),
        }
    }

    pub fn current(&self) -> &AgentExplicitEpistemicModel {
        &self.current
    }

    pub fn yesterday(&self) -> Option<&TemporalEpistemicModel> {
        self.yesterday.as_deref()
    }

    /// Number of snapshots before the current one.
    pub fn history_len(&self) -> usize {
        let mut len = 0;
        let mut cursor = self.yesterday.as_deref();
        while let Some(snapshot) = cursor {
            len += 1;
            cursor = snapshot.yesterday.as_deref();
        }
        len
    }

    /// Forget every snapshot older than `depth` steps.
    pub fn truncate_history(&mut self, depth: usize) {
        if depth == 0 {
            self.yesterday = None;
        } else if let Some(previous) = self.yesterday.as_mut() {
            previous.truncate_history(depth - 1);
        }
    }
}

impl EpistemicModel for TemporalEpistemicModel {
    fn world(&self, id: &str) -> Option<&WorldValuation> {
        self.current.world(id)
    }

    fn world_ids(&self) -> &[String] {
        self.current.world_ids()
    }

    fn successors(&self, id: &str, agent: &str) -> Result<Successors<'_>, ModelError> {
        self.current.successors(id, agent)
    }

    fn pointed_world(&self) -> Option<&str> {
        self.current.pointed_world()
    }

    fn agents(&self) -> &[String] {
        self.current.agents()
    }

    fn edge_count(&self) -> usize {
        self.current.edge_count()
    }

    fn previous(&self) -> Option<&dyn EpistemicModel> {
        self.yesterday
            .as_deref()
            .map(|snapshot| snapshot as &dyn EpistemicModel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;

    fn single(id: &str, props: &[&str]) -> AgentExplicitEpistemicModel {
        let mut m = AgentExplicitEpistemicModel::new("a");
        m.add_world(id, WorldValuation::from_true(props.iter().copied())).unwrap();
        m
    }

    #[test]
    fn yesterday_without_history_is_false() {
        let m = TemporalEpistemicModel::new(single("w", &["p"]));
        assert!(!m.check(&Formula::yesterday(Formula::True)).unwrap());
    }

    #[test]
    fn yesterday_reads_previous_snapshot() {
        let m = TemporalEpistemicModel::new(single("w", &["p"])).advance(single("w_e", &[]));
        let p = Formula::atom("p");
        assert!(!m.check(&p).unwrap());
        assert!(m.check(&Formula::yesterday(p.clone())).unwrap());
        assert!(!m.check(&Formula::yesterday(Formula::yesterday(p))).unwrap());
    }

    #[test]
    fn history_truncation() {
        let mut m = TemporalEpistemicModel::new(single("w0", &[]));
        for i in 1..5 {
            m = m.advance(single(&format!("w{i}"), &[]));
        }
        assert_eq!(m.history_len(), 4);
        m.truncate_history(2);
        assert_eq!(m.history_len(), 2);
        assert_eq!(m.yesterday().and_then(|y| y.pointed_world()), Some("w3"));
        m.truncate_history(0);
        assert!(m.previous().is_none());
    }
}
