// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for submission-script generation.

use std::path::PathBuf;
use thiserror::Error;

use super::ConfigurationError;

/// Filesystem and serialization failures while generating a Slurm pipeline.
///
/// Any of these aborts generation. The partially written directory stays on
/// disk unless cleanup was requested.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize work of node '{node}': {source}")]
    Serialize {
        node: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to remove generation directory '{}': {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot determine the runner program: {0}")]
    CurrentExe(#[source] std::io::Error),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
