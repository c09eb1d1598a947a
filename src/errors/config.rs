// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while declaring or validating a workflow.
///
/// These are surfaced to the caller immediately and never recovered from
/// automatically. Validation of workflow files accumulates several of them
/// before reporting, see [`crate::config::validate_workflow`].
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A node with this name is already part of the graph
    #[error("Duplicate node name: '{name}'")]
    DuplicateName { name: String },

    /// Node names become file names in the Slurm output directory
    #[error("Invalid node name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The same name was declared twice with different metadata
    #[error("Node '{name}' was declared more than once with conflicting {field}")]
    ConflictingDeclaration { name: String, field: &'static str },

    /// A node references a dependency that is not part of the graph
    #[error("Node '{node}' depends on '{missing_dependency}' which does not exist")]
    UnknownDependency {
        node: String,
        missing_dependency: String,
    },

    /// A handle or name does not resolve to a node of this graph
    #[error("Unknown node: '{0}'")]
    UnknownNode(String),

    /// Adding an edge would close a cycle
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// Fan-out must be a positive integer
    #[error("Invalid fan-out for node '{node}': {count} (must be >= 1)")]
    InvalidFanOut { node: String, count: usize },

    /// A postcondition failed to evaluate instead of returning false
    #[error("Postcondition '{postcondition}' of node '{node}' failed: {source}")]
    Postcondition {
        node: String,
        postcondition: String,
        #[source]
        source: anyhow::Error,
    },

    /// A workflow file could not be read or parsed
    #[error("Invalid workflow file '{}': {reason}", .path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    /// Workflow file validation found one or more problems
    #[error("Workflow validation failed:\n{}", .errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    ValidationFailed { errors: Vec<ConfigurationError> },
}

impl ConfigurationError {
    /// True for the errors a duplicate declaration produces.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            ConfigurationError::DuplicateName { .. }
                | ConfigurationError::ConflictingDeclaration { .. }
        )
    }
}
