// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pruning: reduce a graph to the nodes that still have to run.
//!
//! A node is satisfied when it has at least one postcondition and all of them
//! hold. Satisfied nodes leave the execution plan but stay in the graph:
//! their dependents see them as already completed. Nothing is cached between
//! calls, every [`Graph::prune`] re-evaluates the predicates.

use std::time::Instant;

use crate::errors::ConfigurationError;
use crate::graph::{Graph, NodeId};
use crate::observability::messages::graph::{NodeSatisfied, PruningCompleted};
use crate::observability::messages::StructuredLog;

/// The nodes of a graph that still have to run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    pending: Vec<bool>,
    order: Vec<NodeId>,
    satisfied: Vec<NodeId>,
}

impl ExecutionPlan {
    /// A plan that runs every node of the graph.
    pub fn everything(graph: &Graph) -> Self {
        Self {
            pending: vec![true; graph.len()],
            order: graph.bfs_order(),
            satisfied: Vec::new(),
        }
    }

    fn from_pending(graph: &Graph, pending: Vec<bool>) -> Self {
        let order = graph.topological_order(|id| pending[id.index()]);
        let satisfied = graph.ids().filter(|id| !pending[id.index()]).collect();
        Self {
            pending,
            order,
            satisfied,
        }
    }

    /// Pending nodes in topological order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Nodes removed from the plan, in declaration order.
    pub fn satisfied(&self) -> &[NodeId] {
        &self.satisfied
    }

    pub fn is_pending(&self, id: NodeId) -> bool {
        self.pending.get(id.index()).copied().unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Dependencies of `id` that are still part of the plan.
    ///
    /// Edges to satisfied nodes are resolved immediately and never waited on.
    pub fn pending_dependencies<'a>(
        &'a self,
        graph: &'a Graph,
        id: NodeId,
    ) -> impl Iterator<Item = NodeId> + 'a {
        graph[id]
            .dependencies()
            .iter()
            .copied()
            .filter(move |dependency| self.is_pending(*dependency))
    }
}

impl Graph {
    /// Evaluate every postcondition and build the execution plan.
    pub fn prune(&self) -> Result<ExecutionPlan, ConfigurationError> {
        let started = Instant::now();
        let mut pending = Vec::with_capacity(self.len());

        for (_, node) in self.nodes() {
            let satisfied = node.is_satisfied()?;
            if satisfied {
                NodeSatisfied {
                    node: node.name(),
                    postconditions: node.postconditions().len(),
                }
                .log();
            }
            pending.push(!satisfied);
        }

        let plan = ExecutionPlan::from_pending(self, pending);
        PruningCompleted {
            total: self.len(),
            pending: plan.len(),
            satisfied: plan.satisfied().len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingPostcondition, FixedPostcondition, RecordingWork};
    use crate::graph::Node;
    use std::sync::Arc;

    fn node(name: &str, dependencies: &[NodeId]) -> Node {
        Node::new(name, Arc::new(RecordingWork::new())).with_dependencies(dependencies.iter().copied())
    }

    fn names(graph: &Graph, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|id| graph[*id].name().to_string()).collect()
    }

    #[test]
    fn test_nodes_without_postconditions_always_run() {
        let mut graph = Graph::new();
        let a = graph.add_node(node("a", &[])).unwrap();
        graph.add_node(node("b", &[a])).unwrap();

        let plan = graph.prune().unwrap();
        assert_eq!(names(&graph, plan.order()), vec!["a", "b"]);
        assert!(plan.satisfied().is_empty());
    }

    #[test]
    fn test_all_satisfied_gives_empty_plan() {
        let mut graph = Graph::new();
        let a = graph
            .add_node(node("a", &[]).with_postcondition(Box::new(FixedPostcondition::new(true))))
            .unwrap();
        graph
            .add_node(node("b", &[a]).with_postcondition(Box::new(FixedPostcondition::new(true))))
            .unwrap();

        let plan = graph.prune().unwrap();
        assert!(plan.is_empty());
        assert_eq!(names(&graph, plan.satisfied()), vec!["a", "b"]);
    }

    #[test]
    fn test_satisfied_ancestor_releases_descendants() {
        let mut graph = Graph::new();
        let root = graph
            .add_node(node("root", &[]).with_postcondition(Box::new(FixedPostcondition::new(true))))
            .unwrap();
        let left = graph.add_node(node("left", &[root])).unwrap();
        let other = graph.add_node(node("other", &[])).unwrap();
        let join = graph.add_node(node("join", &[left, root, other])).unwrap();

        let plan = graph.prune().unwrap();
        assert!(!plan.is_pending(root));
        assert_eq!(names(&graph, plan.order()), vec!["left", "other", "join"]);
        assert_eq!(
            plan.pending_dependencies(&graph, join).collect::<Vec<_>>(),
            vec![left, other]
        );
        assert_eq!(plan.pending_dependencies(&graph, left).count(), 0);
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let mut graph = Graph::new();
        let a = graph
            .add_node(node("a", &[]).with_postcondition(Box::new(FixedPostcondition::new(true))))
            .unwrap();
        graph
            .add_node(node("b", &[a]).with_postcondition(Box::new(FixedPostcondition::new(false))))
            .unwrap();

        let first = graph.prune().unwrap();
        let second = graph.prune().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pruning_reevaluates_predicates() {
        let flag = FixedPostcondition::new(false);
        let handle = flag.handle();

        let mut graph = Graph::new();
        graph.add_node(node("a", &[]).with_postcondition(Box::new(flag))).unwrap();

        assert_eq!(graph.prune().unwrap().len(), 1);
        handle.set(true);
        assert!(graph.prune().unwrap().is_empty());
    }

    #[test]
    fn test_failing_predicate_aborts_pruning() {
        let mut graph = Graph::new();
        graph
            .add_node(node("a", &[]).with_postcondition(Box::new(FailingPostcondition)))
            .unwrap();
        assert!(matches!(
            graph.prune(),
            Err(ConfigurationError::Postcondition { .. })
        ));
    }

    #[test]
    fn test_everything_plan_matches_bfs_order() {
        let mut graph = Graph::new();
        let a = graph
            .add_node(node("a", &[]).with_postcondition(Box::new(FixedPostcondition::new(true))))
            .unwrap();
        graph.add_node(node("b", &[a])).unwrap();

        let plan = ExecutionPlan::everything(&graph);
        assert_eq!(plan.order(), graph.bfs_order().as_slice());
        assert!(plan.is_pending(a));
    }
}
