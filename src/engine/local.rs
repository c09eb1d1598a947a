// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use crate::errors::{ExecutionError, WorkflowError};
use crate::graph::{Graph, Node};
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionStarted, NodeCompleted, NodeFailed, NodeStarted, TaskInvoked,
};
use crate::observability::messages::StructuredLog;
use crate::traits::work::single_instance_index;
use crate::traits::{RunSummary, WorkflowExecutor};

/// Runs a workflow in-process, one node at a time.
///
/// The graph is pruned first; the remaining nodes run in breadth-first
/// topological order. A fan-out node is invoked once per index. The first
/// failing invocation stops the run and nothing is retried.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalExecutor;

impl LocalExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Prune, then run every pending node.
    pub fn run(&self, graph: &Graph) -> Result<RunSummary, ExecutionError> {
        let started = Instant::now();
        let plan = graph.prune()?;

        ExecutionStarted {
            executor: self.name(),
            pending: plan.len(),
            skipped: plan.satisfied().len(),
        }
        .log();

        let mut summary = RunSummary {
            skipped: plan
                .satisfied()
                .iter()
                .map(|id| graph[*id].name().to_string())
                .collect(),
            ..RunSummary::default()
        };

        for &id in plan.order() {
            let node = &graph[id];
            summary.invocations += Self::run_node(node)?;
            summary.scheduled.push(node.name().to_string());
        }

        ExecutionCompleted {
            executor: self.name(),
            nodes: summary.scheduled.len(),
            invocations: summary.invocations,
            duration: started.elapsed(),
        }
        .log();
        Ok(summary)
    }

    fn run_node(node: &Node) -> Result<usize, ExecutionError> {
        let started = Instant::now();
        NodeStarted {
            node: node.name(),
            fan_out: node.fan_out(),
        }
        .log();

        let indices: Vec<Option<usize>> = if node.is_fan_out() {
            (0..node.fan_out()).map(Some).collect()
        } else {
            vec![single_instance_index(node.work().as_ref())]
        };

        for &index in &indices {
            TaskInvoked {
                node: node.name(),
                index,
            }
            .log();

            if let Err(error) = node.work().invoke(index) {
                NodeFailed {
                    node: node.name(),
                    index,
                    error: &error,
                }
                .log();
                return Err(ExecutionError::NodeFailed {
                    node: node.name().to_string(),
                    index,
                    source: error,
                });
            }
        }

        NodeCompleted {
            node: node.name(),
            invocations: indices.len(),
            duration: started.elapsed(),
        }
        .log();
        Ok(indices.len())
    }
}

impl WorkflowExecutor for LocalExecutor {
    fn execute(&self, graph: &Graph) -> Result<RunSummary, WorkflowError> {
        Ok(self.run(graph)?)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
