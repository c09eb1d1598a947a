// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pruning decisions.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A node was removed from the execution plan.
///
/// # Log Level
/// `debug!` - One per satisfied node
pub struct NodeSatisfied<'a> {
    pub node: &'a str,
    pub postconditions: usize,
}

impl Display for NodeSatisfied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' satisfied ({} postconditions hold), skipping",
            self.node, self.postconditions
        )
    }
}

impl StructuredLog for NodeSatisfied<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            postconditions = self.postconditions,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_satisfied",
            span_name = name,
            node = self.node,
            postconditions = self.postconditions,
        )
    }
}

/// Pruning finished.
///
/// # Log Level
/// `info!` - Once per run
pub struct PruningCompleted {
    pub total: usize,
    pub pending: usize,
    pub satisfied: usize,
    pub duration: Duration,
}

impl Display for PruningCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pruned workflow: {} of {} nodes pending, {} already satisfied ({:?})",
            self.pending, self.total, self.satisfied, self.duration
        )
    }
}

impl StructuredLog for PruningCompleted {
    fn log(&self) {
        tracing::info!(
            total = self.total,
            pending = self.pending,
            satisfied = self.satisfied,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pruning",
            span_name = name,
            total = self.total,
            pending = self.pending,
            satisfied = self.satisfied,
        )
    }
}
