// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for local execution events.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion)
//! * Node lifecycle (start, completion, failure)
//! * Individual fan-out invocations

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use batchflow::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     executor: "local",
///     pending: 3,
///     skipped: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub executor: &'a str,
    pub pending: usize,
    pub skipped: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} execution: {} nodes to run, {} skipped",
            self.executor, self.pending, self.skipped
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            executor = self.executor,
            pending = self.pending,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            executor = self.executor,
            pending = self.pending,
            skipped = self.skipped,
        )
    }
}

/// Execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub executor: &'a str,
    pub nodes: usize,
    pub invocations: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} execution completed: {} nodes, {} invocations in {:?}",
            self.executor, self.nodes, self.invocations, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            executor = self.executor,
            nodes = self.nodes,
            invocations = self.invocations,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            executor = self.executor,
            nodes = self.nodes,
            invocations = self.invocations,
            duration = ?self.duration,
        )
    }
}

/// A node is about to run.
///
/// # Log Level
/// `info!`
///
/// # Example
/// ```
/// use batchflow::observability::messages::engine::NodeStarted;
///
/// let msg = NodeStarted {
///     node: "simulate_train",
///     fan_out: 100,
/// };
///
/// assert_eq!(msg.to_string(), "Running node 'simulate_train' (100 tasks)");
/// ```
pub struct NodeStarted<'a> {
    pub node: &'a str,
    pub fan_out: usize,
}

impl Display for NodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.fan_out > 1 {
            write!(f, "Running node '{}' ({} tasks)", self.node, self.fan_out)
        } else {
            write!(f, "Running node '{}'", self.node)
        }
    }
}

impl StructuredLog for NodeStarted<'_> {
    fn log(&self) {
        tracing::info!(node = self.node, fan_out = self.fan_out, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node",
            span_name = name,
            node = self.node,
            fan_out = self.fan_out,
        )
    }
}

/// One invocation of a node's work.
///
/// # Log Level
/// `debug!` - High-frequency event
pub struct TaskInvoked<'a> {
    pub node: &'a str,
    pub index: Option<usize>,
}

impl Display for TaskInvoked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "Invoking '{}' task {}", self.node, index),
            None => write!(f, "Invoking '{}'", self.node),
        }
    }
}

impl StructuredLog for TaskInvoked<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, index = ?self.index, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("task", span_name = name, node = self.node, index = ?self.index)
    }
}

/// A node finished all of its invocations.
///
/// # Log Level
/// `debug!`
pub struct NodeCompleted<'a> {
    pub node: &'a str,
    pub invocations: usize,
    pub duration: std::time::Duration,
}

impl Display for NodeCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' completed: {} invocations in {:?}",
            self.node, self.invocations, self.duration
        )
    }
}

impl StructuredLog for NodeCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            invocations = self.invocations,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_completed",
            span_name = name,
            node = self.node,
            invocations = self.invocations,
        )
    }
}

/// A node's work returned an error. The run stops here.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct NodeFailed<'a> {
    pub node: &'a str,
    pub index: Option<usize>,
    pub error: &'a anyhow::Error,
}

impl Display for NodeFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "Node '{}' task {} failed: {:#}", self.node, index, self.error),
            None => write!(f, "Node '{}' failed: {:#}", self.node, self.error),
        }
    }
}

impl StructuredLog for NodeFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            index = ?self.index,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "node_failed",
            span_name = name,
            node = self.node,
            index = ?self.index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_invoked_display() {
        let indexed = TaskInvoked {
            node: "simulate",
            index: Some(3),
        };
        assert_eq!(indexed.to_string(), "Invoking 'simulate' task 3");

        let single = TaskInvoked {
            node: "merge",
            index: None,
        };
        assert_eq!(single.to_string(), "Invoking 'merge'");
    }

    #[test]
    fn test_node_failed_display_includes_cause_chain() {
        let error = anyhow::anyhow!("disk full").context("writing block");
        let msg = NodeFailed {
            node: "simulate",
            index: Some(1),
            error: &error,
        };
        assert_eq!(
            msg.to_string(),
            "Node 'simulate' task 1 failed: writing block: disk full"
        );
    }
}
