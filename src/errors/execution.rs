// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for in-process execution and for the runner stub.

use std::path::PathBuf;
use thiserror::Error;

use super::ConfigurationError;

/// Errors that stop a local run.
///
/// A failing node is fatal: the executor does not continue past it and does
/// not retry. Side effects of nodes that already ran are left in place.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A node's work returned an error
    #[error("Node '{node}' failed{}: {source}", .index.map(|i| format!(" (task {i})")).unwrap_or_default())]
    NodeFailed {
        node: String,
        index: Option<usize>,
        #[source]
        source: anyhow::Error,
    },

    /// Pruning could not evaluate a postcondition
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The runner could not read or decode a serialized work artifact
    #[error("Cannot load work artifact '{}': {reason}", .path.display())]
    Artifact { path: PathBuf, reason: String },

    /// A registered work reference has no matching node in this process
    #[error("No work registered under '{name}'")]
    UnknownWork { name: String },
}

impl ExecutionError {
    /// Name of the node that failed, when the error comes from a work unit.
    pub fn node(&self) -> Option<&str> {
        match self {
            ExecutionError::NodeFailed { node, .. } => Some(node),
            _ => None,
        }
    }
}
