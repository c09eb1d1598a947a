// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::ConfigurationError;
use crate::graph::{check_name, Node, NodeId};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Every declared node of a workflow plus the edges between them.
///
/// Nodes are stored in declaration order. For each node the graph keeps the
/// list of its dependents as well, so both directions are O(1) lookups.
/// Every graph carries a process-unique id that its handles are stamped with.
#[derive(Debug)]
pub struct Graph {
    id: u64,
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    dependents: Vec<Vec<NodeId>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            names: HashMap::new(),
            dependents: Vec::new(),
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Its dependencies must already be part of this graph.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, ConfigurationError> {
        check_name(&node.name)?;
        if self.names.contains_key(&node.name) {
            return Err(ConfigurationError::DuplicateName { name: node.name });
        }
        if node.fan_out == 0 {
            return Err(ConfigurationError::InvalidFanOut {
                node: node.name,
                count: 0,
            });
        }
        if let Some(missing) = node
            .dependencies
            .iter()
            .find(|dependency| !self.contains(**dependency))
        {
            return Err(ConfigurationError::UnknownDependency {
                node: node.name,
                missing_dependency: missing.to_string(),
            });
        }

        let id = self.handle(self.nodes.len());
        for dependency in &node.dependencies {
            self.dependents[dependency.index].push(id);
        }
        self.names.insert(node.name.clone(), id);
        self.nodes.push(node);
        self.dependents.push(Vec::new());
        Ok(id)
    }

    /// Make `node` depend on `upstream`, rejecting edges that close a cycle.
    pub fn add_dependency(&mut self, node: NodeId, upstream: NodeId) -> Result<(), ConfigurationError> {
        self.add_dependencies(node, &[upstream])
    }

    /// Make `node` depend on every handle in `upstream`, or on none of them.
    ///
    /// All edges are checked before the first one is inserted. New edges all
    /// leave `node`, so none of them can create a path into `node` for a later
    /// one: checking each against the current graph is enough.
    pub fn add_dependencies(&mut self, node: NodeId, upstream: &[NodeId]) -> Result<(), ConfigurationError> {
        self.check(node)?;
        for &dependency in upstream {
            self.check(dependency)?;
            if self.nodes[node.index].dependencies.contains(&dependency) {
                continue;
            }
            if let Some(path) = self.dependency_path(dependency, node) {
                // node -> dependency -> ... -> node
                let mut cycle = vec![self.nodes[node.index].name.clone()];
                cycle.extend(path.into_iter().map(|id| self.nodes[id.index].name.clone()));
                return Err(ConfigurationError::CyclicDependency { cycle });
            }
        }

        for &dependency in upstream {
            if self.nodes[node.index].dependencies.contains(&dependency) {
                continue;
            }
            self.nodes[node.index].dependencies.push(dependency);
            let dependents = &mut self.dependents[dependency.index];
            dependents.push(node);
            dependents.sort_unstable();
        }
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if self.contains(id) {
            self.nodes.get(id.index)
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, ConfigurationError> {
        self.check(id)?;
        Ok(&mut self.nodes[id.index])
    }

    /// True when `id` was issued by this graph.
    pub fn contains(&self, id: NodeId) -> bool {
        id.graph == self.id && id.index < self.nodes.len()
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Node> {
        self.id_of(name).map(|id| &self.nodes[id.index])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node handles in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        let graph = self.id;
        (0..self.nodes.len()).map(move |index| NodeId { graph, index })
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (self.handle(i), node))
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn dependents(&self, id: NodeId) -> &[NodeId] {
        if self.contains(id) {
            &self.dependents[id.index]
        } else {
            &[]
        }
    }

    /// The dependency relation as `(dependency, dependent)` pairs.
    pub fn edges(&self) -> Vec<(&Node, &Node)> {
        self.nodes()
            .flat_map(|(_, node)| {
                node.dependencies
                    .iter()
                    .map(move |dependency| (&self.nodes[dependency.index], node))
            })
            .collect()
    }

    /// Deterministic topological order of the whole graph.
    ///
    /// Breadth-first from the roots, releasing a node only once all of its
    /// dependencies have been emitted. Ties go to declaration order.
    pub fn bfs_order(&self) -> Vec<NodeId> {
        self.topological_order(|_| true)
    }

    /// Same traversal restricted to the nodes accepted by `include`.
    ///
    /// Dependencies outside the selection count as already completed.
    pub(crate) fn topological_order(&self, include: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let selected: Vec<bool> = self.ids().map(&include).collect();

        let mut in_degree: Vec<usize> = self
            .nodes
            .iter()
            .map(|node| {
                node.dependencies
                    .iter()
                    .filter(|dependency| selected[dependency.index])
                    .count()
            })
            .collect();

        let mut queue: VecDeque<NodeId> = self
            .ids()
            .filter(|id| selected[id.index] && in_degree[id.index] == 0)
            .collect();
        let mut order = Vec::with_capacity(queue.len());

        while let Some(current) = queue.pop_front() {
            order.push(current);
            for &dependent in &self.dependents[current.index] {
                if !selected[dependent.index] {
                    continue;
                }
                in_degree[dependent.index] -= 1;
                if in_degree[dependent.index] == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        debug_assert_eq!(
            order.len(),
            selected.iter().filter(|s| **s).count(),
            "graph invariant violated: cycle among selected nodes"
        );
        order
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId { graph: self.id, index }
    }

    fn check(&self, id: NodeId) -> Result<(), ConfigurationError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(ConfigurationError::UnknownNode(id.to_string()))
        }
    }

    /// Path `from -> ... -> to` following dependency edges, if one exists.
    fn dependency_path(&self, from: NodeId, to: NodeId) -> Option<Vec<NodeId>> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if self.dfs_path(from, to, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeId,
        target: NodeId,
        visited: &mut HashSet<NodeId>,
        path: &mut Vec<NodeId>,
    ) -> bool {
        path.push(current);
        if current == target {
            return true;
        }
        if visited.insert(current) {
            for &dependency in &self.nodes[current.index].dependencies {
                if self.dfs_path(dependency, target, visited, path) {
                    return true;
                }
            }
        }
        path.pop();
        false
    }
}

impl Index<NodeId> for Graph {
    type Output = Node;

    /// Panics when `id` belongs to another graph.
    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node handle {id} does not belong to this graph"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingWork;
    use std::sync::Arc;

    fn node(name: &str, dependencies: &[NodeId]) -> Node {
        Node::new(name, Arc::new(RecordingWork::new())).with_dependencies(dependencies.iter().copied())
    }

    fn names(graph: &Graph, order: &[NodeId]) -> Vec<String> {
        order.iter().map(|id| graph[*id].name().to_string()).collect()
    }

    fn assert_topological(graph: &Graph, order: &[NodeId]) {
        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for (id, node) in graph.nodes() {
            for dependency in node.dependencies() {
                assert!(
                    position[dependency] < position[&id],
                    "'{}' emitted before its dependency '{}'",
                    node.name(),
                    graph[*dependency].name()
                );
            }
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = Graph::new();
        graph.add_node(node("a", &[])).unwrap();
        let err = graph.add_node(node("a", &[])).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateName { ref name } if name == "a"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_unknown_dependency_rejected() {
        let mut graph = Graph::new();
        let missing = graph.handle(3);
        let err = graph.add_node(node("b", &[missing])).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnknownDependency { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_handles_from_another_graph_are_rejected() {
        let mut other = Graph::new();
        other.add_node(node("x", &[])).unwrap();
        let foreign = other.add_node(node("y", &[])).unwrap();

        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        graph.add_node(node("b", &[])).unwrap();
        assert_eq!(foreign.index(), 1);

        assert!(!graph.contains(foreign));
        assert!(graph.get(foreign).is_none());
        assert!(graph.dependents(foreign).is_empty());
        assert!(matches!(
            graph.add_node(node("c", &[foreign])).unwrap_err(),
            ConfigurationError::UnknownDependency { .. }
        ));
        assert!(matches!(
            graph.add_dependency(a, foreign).unwrap_err(),
            ConfigurationError::UnknownNode(_)
        ));
        assert!(graph.get_mut(foreign).is_err());
        assert_eq!(graph.len(), 2);
        assert!(graph[a].is_root());
    }

    #[test]
    fn test_names_must_be_usable_as_file_names() {
        let mut graph = Graph::new();
        for name in ["", ".", "..", "train/merge"] {
            let err = graph.add_node(node(name, &[])).unwrap_err();
            assert!(matches!(err, ConfigurationError::InvalidName { .. }), "{name:?}");
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_zero_fan_out_rejected() {
        let mut graph = Graph::new();
        let err = graph.add_node(node("a", &[]).with_fan_out(0)).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidFanOut { count: 0, .. }));
    }

    #[test]
    fn test_roots_and_edges() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[])).unwrap();
        graph.add_node(node("c", &[a, b])).unwrap();

        assert_eq!(graph.roots(), vec![a, b]);
        let edges: Vec<(&str, &str)> = graph
            .edges()
            .into_iter()
            .map(|(from, to)| (from.name(), to.name()))
            .collect();
        assert_eq!(edges, vec![("a", "c"), ("b", "c")]);
    }

    #[test]
    fn test_bfs_order_independent_branches() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("A", &[])).unwrap();
        graph.add_node(node("A1", &[a])).unwrap();
        let b = graph.add_node(node("B", &[])).unwrap();
        graph.add_node(node("B1", &[b])).unwrap();

        let order = graph.bfs_order();
        assert_eq!(names(&graph, &order), vec!["A", "B", "A1", "B1"]);
    }

    #[test]
    fn test_bfs_order_waits_for_all_dependencies() {
        // a -> b -> c, and d depends on both a and c
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        let c = graph.add_node(node("c", &[b])).unwrap();
        graph.add_node(node("d", &[a, c])).unwrap();

        let order = graph.bfs_order();
        assert_eq!(names(&graph, &order), vec!["a", "b", "c", "d"]);
        assert_topological(&graph, &order);
    }

    #[test]
    fn test_bfs_order_diamond_and_late_edges() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        let c = graph.add_node(node("c", &[a])).unwrap();
        let d = graph.add_node(node("d", &[b, c])).unwrap();
        let e = graph.add_node(node("e", &[])).unwrap();
        // e becomes a dependent of d after the fact
        graph.add_dependency(e, d).unwrap();

        let order = graph.bfs_order();
        assert_eq!(order.len(), 5);
        assert_topological(&graph, &order);
        assert_eq!(names(&graph, &order), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_add_dependency_detects_cycle() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        let c = graph.add_node(node("c", &[b])).unwrap();

        let err = graph.add_dependency(a, c).unwrap_err();
        match err {
            ConfigurationError::CyclicDependency { cycle } => {
                assert_eq!(cycle, vec!["a", "c", "b", "a"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(graph[a].is_root());
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let err = graph.add_dependency(a, a).unwrap_err();
        assert!(matches!(err, ConfigurationError::CyclicDependency { ref cycle } if cycle == &["a", "a"]));
    }

    #[test]
    fn test_add_dependencies_is_all_or_nothing() {
        // b -> a, c -> b; then d and c together for a: c closes a cycle
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        let c = graph.add_node(node("c", &[b])).unwrap();
        let d = graph.add_node(node("d", &[])).unwrap();

        let err = graph.add_dependencies(a, &[d, c]).unwrap_err();
        assert!(matches!(err, ConfigurationError::CyclicDependency { .. }));
        assert!(graph[a].is_root());
        assert!(graph.dependents(d).is_empty());

        graph.add_dependencies(d, &[a, c]).unwrap();
        assert_eq!(graph[d].dependencies(), &[a, c]);
    }

    #[test]
    fn test_add_dependency_is_idempotent() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        graph.add_dependency(b, a).unwrap();
        assert_eq!(graph[b].dependencies(), &[a]);
        assert_eq!(graph.dependents(a), &[b]);
    }

    #[test]
    fn test_topological_order_treats_excluded_dependencies_as_done() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        let b = graph.add_node(node("b", &[a])).unwrap();
        graph.add_node(node("c", &[b])).unwrap();

        let order = graph.topological_order(|id| id != b);
        assert_eq!(names(&graph, &order), vec!["a", "c"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("merge", &[])).unwrap();
        assert_eq!(graph.id_of("merge"), Some(a));
        assert_eq!(graph.by_name("merge").map(Node::name), Some("merge"));
        assert!(graph.by_name("missing").is_none());
        assert!(graph.get(graph.handle(7)).is_none());
    }
}
