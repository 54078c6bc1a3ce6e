//! Labelled multigraph substrate shared by epistemic and event models.
//!
//! Nodes are keyed by string id and carry arbitrary content. Each agent owns
//! a successor relation `source -> {destinations}`. Every id referenced by a
//! relation exists in `nodes`: edges to or from missing nodes are rejected,
//! and removing a node removes every edge touching it.

use std::collections::{btree_set, BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::slice;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// One hop of a path: reach `world` through `agent`'s relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub agent: String,
    pub world: String,
}

/// The successor set of a node for one agent.
///
/// Explicit graphs hand out their stored set; representations whose relation
/// is total hand out the full list of node ids without materializing edges.
#[derive(Debug, Clone, Copy)]
pub enum Successors<'a> {
    Empty,
    Set(&'a BTreeSet<String>),
    All(&'a [String]),
}

impl<'a> Successors<'a> {
    pub fn iter(&self) -> SuccessorsIter<'a> {
        match *self {
            Successors::Empty => SuccessorsIter::Empty,
            Successors::Set(set) => SuccessorsIter::Set(set.iter()),
            Successors::All(ids) => SuccessorsIter::All(ids.iter()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Successors::Empty => 0,
            Successors::Set(set) => set.len(),
            Successors::All(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            Successors::Empty => false,
            Successors::Set(set) => set.contains(id),
            Successors::All(ids) => ids.iter().any(|i| i == id),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

impl<'a> IntoIterator for Successors<'a> {
    type Item = &'a str;
    type IntoIter = SuccessorsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Successors`] value.
pub enum SuccessorsIter<'a> {
    Empty,
    Set(btree_set::Iter<'a, String>),
    All(slice::Iter<'a, String>),
}

impl<'a> Iterator for SuccessorsIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self {
            SuccessorsIter::Empty => None,
            SuccessorsIter::Set(it) => it.next().map(String::as_str),
            SuccessorsIter::All(it) => it.next().map(String::as_str),
        }
    }
}

type Relation = HashMap<String, BTreeSet<String>>;

/// Nodes keyed by id, per-agent successor relations, and an optional
/// pointed node.
#[derive(Debug, Clone)]
pub struct Graph<C> {
    nodes: HashMap<String, C>,
    /// Insertion order of node ids.
    order: Vec<String>,
    successors: BTreeMap<String, Relation>,
    pointed: Option<String>,
}

impl<C> Graph<C> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            successors: BTreeMap::new(),
            pointed: None,
        }
    }

    /// Insert a node. Fails if the id is already taken.
    pub fn add_node(&mut self, id: impl Into<String>, content: C) -> Result<(), GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.order.push(id.clone());
        self.nodes.insert(id, content);
        Ok(())
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node's content by id.
    pub fn node(&self, id: &str) -> Option<&C> {
        self.nodes.get(id)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Node ids in insertion order, as a slice.
    pub fn node_id_slice(&self) -> &[String] {
        &self.order
    }

    /// `(id, content)` pairs in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &C)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.nodes.get(id).map(|c| (id.as_str(), c)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Agents that own a relation entry, in sorted order.
    pub fn agents(&self) -> impl Iterator<Item = &str> + '_ {
        self.successors.keys().map(String::as_str)
    }

    /// Remove a node and every edge that touches it.
    pub fn remove_node(&mut self, id: &str) -> Result<C, GraphError> {
        let content = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))?;
        self.order.retain(|n| n != id);
        for relation in self.successors.values_mut() {
            relation.remove(id);
            for dests in relation.values_mut() {
                dests.remove(id);
            }
        }
        if self.pointed.as_deref() == Some(id) {
            self.pointed = None;
        }
        Ok(content)
    }

    /// Add an edge for `agent`. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, agent: &str, src: &str, dst: &str) -> Result<(), GraphError> {
        if !self.nodes.contains_key(src) {
            return Err(GraphError::UnknownNode(src.to_string()));
        }
        if !self.nodes.contains_key(dst) {
            return Err(GraphError::UnknownNode(dst.to_string()));
        }
        self.successors
            .entry(agent.to_string())
            .or_default()
            .entry(src.to_string())
            .or_default()
            .insert(dst.to_string());
        Ok(())
    }

    /// Replace `agent`'s relation by the complete relation over the current nodes.
    pub fn bulk_add_edges(&mut self, agent: &str) {
        let all: BTreeSet<String> = self.order.iter().cloned().collect();
        let relation: Relation = self
            .order
            .iter()
            .map(|src| (src.clone(), all.clone()))
            .collect();
        self.successors.insert(agent.to_string(), relation);
    }

    /// Add `src -> dst` for every ordered pair (self-pairs included) whose
    /// contents satisfy `condition`.
    pub fn add_edge_if<F>(&mut self, agent: &str, mut condition: F)
    where
        F: FnMut(&C, &C) -> bool,
    {
        let mut added: Vec<(String, String)> = Vec::new();
        for (src, a) in self.nodes() {
            for (dst, b) in self.nodes() {
                if condition(a, b) {
                    added.push((src.to_string(), dst.to_string()));
                }
            }
        }
        let relation = self.successors.entry(agent.to_string()).or_default();
        for (src, dst) in added {
            relation.entry(src).or_default().insert(dst);
        }
    }

    /// Make `ids` pairwise connected for `agent`, self-loops included.
    pub fn add_edges_cluster(&mut self, agent: &str, ids: &[&str]) -> Result<(), GraphError> {
        for id in ids {
            if !self.nodes.contains_key(*id) {
                return Err(GraphError::UnknownNode(id.to_string()));
            }
        }
        for src in ids {
            for dst in ids {
                self.add_edge(agent, src, dst)?;
            }
        }
        Ok(())
    }

    /// Add a self-loop on every node.
    pub fn make_reflexive_relation(&mut self, agent: &str) {
        let relation = self.successors.entry(agent.to_string()).or_default();
        for id in &self.order {
            relation.entry(id.clone()).or_default().insert(id.clone());
        }
    }

    /// Connect every ordered pair of nodes, keeping existing edges.
    pub fn make_complete_relation(&mut self, agent: &str) {
        let relation = self.successors.entry(agent.to_string()).or_default();
        for src in &self.order {
            let dests = relation.entry(src.clone()).or_default();
            dests.extend(self.order.iter().cloned());
        }
    }

    /// Add `j -> i` for every existing `i -> j`.
    pub fn make_symmetric_relation(&mut self, agent: &str) {
        let Some(relation) = self.successors.get_mut(agent) else {
            return;
        };
        let reversed: Vec<(String, String)> = relation
            .iter()
            .flat_map(|(src, dests)| dests.iter().map(move |dst| (dst.clone(), src.clone())))
            .collect();
        for (src, dst) in reversed {
            relation.entry(src).or_default().insert(dst);
        }
    }

    /// Whether `agent` has the edge `src -> dst`. Unknown agents or nodes
    /// simply have no edges.
    pub fn is_edge(&self, agent: &str, src: &str, dst: &str) -> bool {
        self.successors
            .get(agent)
            .and_then(|r| r.get(src))
            .is_some_and(|dests| dests.contains(dst))
    }

    /// True when every node has a self-loop for `agent`.
    pub fn is_reflexive(&self, agent: &str) -> bool {
        self.order.iter().all(|id| self.is_edge(agent, id, id))
    }

    /// Successors of `node` for `agent`, in id order.
    ///
    /// Fails if `node` is unknown; an agent without an entry for `node`
    /// yields an empty set.
    pub fn successors(&self, node: &str, agent: &str) -> Result<Successors<'_>, GraphError> {
        if !self.nodes.contains_key(node) {
            return Err(GraphError::UnknownNode(node.to_string()));
        }
        Ok(self
            .successors
            .get(agent)
            .and_then(|r| r.get(node))
            .map_or(Successors::Empty, Successors::Set))
    }

    /// All edges as `(agent, source, destination)`.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &str)> + '_ {
        self.successors.iter().flat_map(|(agent, relation)| {
            relation.iter().flat_map(move |(src, dests)| {
                dests
                    .iter()
                    .map(move |dst| (agent.as_str(), src.as_str(), dst.as_str()))
            })
        })
    }

    /// Total number of edges over all agents.
    pub fn edge_count(&self) -> usize {
        self.successors
            .values()
            .flat_map(|r| r.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// Delete every node not reachable from `seeds` through the union of all
    /// agents' relations. Returns the number of removed nodes.
    ///
    /// Uses an explicit worklist so deep models cannot exhaust the stack.
    pub fn remove_unreachable_from(&mut self, seeds: &[&str]) -> Result<usize, GraphError> {
        for seed in seeds {
            if !self.nodes.contains_key(*seed) {
                return Err(GraphError::UnknownNode(seed.to_string()));
            }
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<&str> = seeds.to_vec();
        while let Some(node) = stack.pop() {
            if !visited.insert(node.to_string()) {
                continue;
            }
            for relation in self.successors.values() {
                if let Some(dests) = relation.get(node) {
                    stack.extend(dests.iter().map(String::as_str));
                }
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| visited.contains(id));
        self.order.retain(|id| visited.contains(id));
        for relation in self.successors.values_mut() {
            relation.retain(|src, _| visited.contains(src));
            for dests in relation.values_mut() {
                dests.retain(|dst| visited.contains(dst));
            }
        }
        if let Some(p) = &self.pointed {
            if !visited.contains(p) {
                self.pointed = None;
            }
        }
        Ok(before - self.nodes.len())
    }

    /// Mark `id` as the pointed node.
    pub fn set_pointed_node(&mut self, id: &str) -> Result<(), GraphError> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::UnknownNode(id.to_string()));
        }
        self.pointed = Some(id.to_string());
        Ok(())
    }

    pub fn pointed_node(&self) -> Option<&str> {
        self.pointed.as_deref()
    }

    /// A shortest path from `src` to `dst` over the union of relations, or
    /// `None` if `dst` is unreachable. Among equally short paths, the one
    /// discovered first (agents in sorted order, successors in id order) wins.
    pub fn shortest_path(&self, src: &str, dst: &str) -> Result<Option<Vec<PathStep>>, GraphError> {
        if !self.nodes.contains_key(src) {
            return Err(GraphError::UnknownNode(src.to_string()));
        }
        if !self.nodes.contains_key(dst) {
            return Err(GraphError::UnknownNode(dst.to_string()));
        }

        // node -> (parent, agent used to reach it)
        let mut parent: HashMap<&str, Option<(&str, &str)>> = HashMap::new();
        let mut queue = VecDeque::new();
        parent.insert(src, None);
        queue.push_back(src);

        let mut found = false;
        while let Some(node) = queue.pop_front() {
            if node == dst {
                found = true;
                break;
            }
            for (agent, relation) in &self.successors {
                if let Some(dests) = relation.get(node) {
                    for next in dests {
                        if !parent.contains_key(next.as_str()) {
                            parent.insert(next.as_str(), Some((node, agent.as_str())));
                            queue.push_back(next.as_str());
                        }
                    }
                }
            }
        }
        if !found {
            return Ok(None);
        }

        let mut path = Vec::new();
        let mut cursor = dst;
        while let Some(Some((prev, agent))) = parent.get(cursor) {
            path.push(PathStep {
                agent: agent.to_string(),
                world: cursor.to_string(),
            });
            cursor = prev;
        }
        path.reverse();
        Ok(Some(path))
    }

    /// Breadth-first distances from `src`, exploring at most `max_distance` hops.
    pub fn distances_from(
        &self,
        src: &str,
        max_distance: usize,
    ) -> Result<HashMap<String, usize>, GraphError> {
        if !self.nodes.contains_key(src) {
            return Err(GraphError::UnknownNode(src.to_string()));
        }
        let mut dist: HashMap<String, usize> = HashMap::new();
        let mut queue = VecDeque::new();
        dist.insert(src.to_string(), 0);
        queue.push_back((src, 0usize));
        while let Some((node, d)) = queue.pop_front() {
            if d >= max_distance {
                continue;
            }
            for relation in self.successors.values() {
                if let Some(dests) = relation.get(node) {
                    for next in dests {
                        if !dist.contains_key(next) {
                            dist.insert(next.clone(), d + 1);
                            queue.push_back((next.as_str(), d + 1));
                        }
                    }
                }
            }
        }
        Ok(dist)
    }
}

impl<C> Default for Graph<C> {
    fn default() -> Self {
        Self::new()
    }
}
