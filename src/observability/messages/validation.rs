// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow file validation.
//!
//! This module contains message types for logging events related to:
//! * Validation lifecycle (start, completion)
//! * Individual validation failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Validation of a workflow file started.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use batchflow::observability::messages::validation::ValidationStarted;
///
/// let msg = ValidationStarted { node_count: 5 };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ValidationStarted {
    pub node_count: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validating workflow with {} nodes", self.node_count)
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::debug!(node_count = self.node_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::DEBUG,
            "validation",
            name = name,
            node_count = self.node_count,
        )
    }
}

/// Validation finished without errors.
///
/// # Log Level
/// `debug!`
pub struct ValidationCompleted {
    pub node_count: usize,
    pub edge_count: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow is valid: {} nodes, {} dependency edges",
            self.node_count, self.edge_count
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            edge_count = self.edge_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::DEBUG,
            "validation_completed",
            name = name,
            node_count = self.node_count,
            edge_count = self.edge_count,
        )
    }
}

/// One validation error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed<'a> {
    pub error: &'a crate::errors::ConfigurationError,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validation failed: {}", self.error)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(tracing::Level::ERROR, "validation_failed", name = name)
    }
}
