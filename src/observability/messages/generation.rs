// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for Slurm script generation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// Script generation started.
///
/// # Log Level
/// `info!`
pub struct GenerationStarted<'a> {
    pub directory: &'a Path,
    pub nodes: usize,
    pub skipped: usize,
}

impl Display for GenerationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Generating Slurm pipeline in '{}': {} nodes, {} skipped",
            self.directory.display(),
            self.nodes,
            self.skipped
        )
    }
}

impl StructuredLog for GenerationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            directory = %self.directory.display(),
            nodes = self.nodes,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "generation",
            span_name = name,
            directory = %self.directory.display(),
            nodes = self.nodes,
        )
    }
}

/// A generated file was written.
///
/// # Log Level
/// `debug!` - One per artifact and script
pub struct FileWritten<'a> {
    pub kind: &'a str,
    pub node: Option<&'a str>,
    pub path: &'a Path,
}

impl Display for FileWritten<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.node {
            Some(node) => write!(f, "Wrote {} for '{}' to '{}'", self.kind, node, self.path.display()),
            None => write!(f, "Wrote {} to '{}'", self.kind, self.path.display()),
        }
    }
}

impl StructuredLog for FileWritten<'_> {
    fn log(&self) {
        tracing::debug!(
            kind = self.kind,
            node = self.node,
            path = %self.path.display(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("file_written", span_name = name, kind = self.kind)
    }
}

/// Generation finished.
///
/// # Log Level
/// `info!`
pub struct GenerationCompleted<'a> {
    pub pipeline: &'a Path,
    pub submissions: usize,
    pub duration: Duration,
}

impl Display for GenerationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' ready: {} submissions ({:?})",
            self.pipeline.display(),
            self.submissions,
            self.duration
        )
    }
}

impl StructuredLog for GenerationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = %self.pipeline.display(),
            submissions = self.submissions,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "generation_completed",
            span_name = name,
            submissions = self.submissions,
        )
    }
}

/// The generation directory is removed right after it was written.
///
/// # Log Level
/// `warn!` - Nothing will be left to submit
pub struct CleanupRequested<'a> {
    pub directory: &'a Path,
}

impl Display for CleanupRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cleanup requested: removing '{}', the generated pipeline will not be available for submission",
            self.directory.display()
        )
    }
}

impl StructuredLog for CleanupRequested<'_> {
    fn log(&self) {
        tracing::warn!(directory = %self.directory.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "cleanup",
            span_name = name,
            directory = %self.directory.display(),
        )
    }
}

/// Removing the generation directory failed after generation itself failed.
///
/// # Log Level
/// `error!` - The generation error is still the one returned
pub struct CleanupFailed<'a> {
    pub directory: &'a Path,
    pub error: &'a std::io::Error,
}

impl Display for CleanupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Could not remove '{}' after failed generation: {}",
            self.directory.display(),
            self.error
        )
    }
}

impl StructuredLog for CleanupFailed<'_> {
    fn log(&self) {
        tracing::error!(
            directory = %self.directory.display(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cleanup_failed",
            span_name = name,
            directory = %self.directory.display(),
        )
    }
}

/// A node is left out of the generated pipeline because it is satisfied.
///
/// # Log Level
/// `warn!` - Its dependents are submitted without waiting on it
pub struct NodeOmitted<'a> {
    pub node: &'a str,
}

impl Display for NodeOmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' is already satisfied, not generating a job for it",
            self.node
        )
    }
}

impl StructuredLog for NodeOmitted<'_> {
    fn log(&self) {
        tracing::warn!(node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("node_omitted", span_name = name, node = self.node)
    }
}
