// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use crate::errors::WorkflowError;
use crate::graph::Graph;

/// What an executor did with a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Nodes that were run (local) or materialized into scripts (slurm), in order
    pub scheduled: Vec<String>,
    /// Nodes skipped because their postconditions already hold
    pub skipped: Vec<String>,
    /// Total work invocations, counting every fan-out instance
    pub invocations: usize,
    /// Pipeline script, when the executor generates one and it was kept
    pub pipeline: Option<PathBuf>,
}

pub trait WorkflowExecutor {
    /// Consume the declared graph: run it, or turn it into something runnable.
    fn execute(&self, graph: &Graph) -> Result<RunSummary, WorkflowError>;

    fn name(&self) -> &'static str;
}
