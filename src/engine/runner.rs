// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The runner side of distributed execution.
//!
//! Every Slurm job runs the generated `processor` stub, which calls
//! `<program> run-node <artifact> [index]`. The artifact names the node and
//! carries its [`WorkSpec`]. Shell work is self-contained; registered work is
//! looked up by name in the graph the runner program declared.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backends::ShellWork;
use crate::config::consts::RUN_NODE_COMMAND;
use crate::errors::ExecutionError;
use crate::graph::Graph;
use crate::observability::messages::engine::{NodeFailed, TaskInvoked};
use crate::observability::messages::StructuredLog;
use crate::traits::work::single_instance_index;
use crate::traits::{Work, WorkSpec};

/// Contents of a `<node>.code` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkArtifact {
    pub node: String,
    pub fan_out: usize,
    pub work: WorkSpec,
}

impl WorkArtifact {
    pub fn load(path: &Path) -> Result<Self, ExecutionError> {
        let artifact_error = |reason: String| ExecutionError::Artifact {
            path: path.to_path_buf(),
            reason,
        };
        let content = fs::read_to_string(path).map_err(|e| artifact_error(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| artifact_error(e.to_string()))
    }
}

/// Load the artifact at `path` and invoke its work once.
///
/// Without an index, nullary work is called bare and indexed work gets 0.
/// `graph` resolves registered work; shell artifacts do not need it.
pub fn run_artifact(
    graph: Option<&Graph>,
    path: &Path,
    index: Option<usize>,
) -> Result<(), ExecutionError> {
    let artifact = WorkArtifact::load(path)?;

    match &artifact.work {
        WorkSpec::Shell { command } => invoke(&artifact.node, &ShellWork::new(command.as_str()), index),
        WorkSpec::Registered { name } => {
            let node = graph
                .and_then(|graph| graph.by_name(name))
                .ok_or_else(|| ExecutionError::UnknownWork { name: name.clone() })?;
            invoke(&artifact.node, node.work().as_ref(), index)
        }
    }
}

fn invoke(node: &str, work: &dyn Work, index: Option<usize>) -> Result<(), ExecutionError> {
    let index = index.or_else(|| single_instance_index(work));
    TaskInvoked { node, index }.log();

    work.invoke(index).map_err(|error| {
        NodeFailed {
            node,
            index,
            error: &error,
        }
        .log();
        ExecutionError::NodeFailed {
            node: node.to_string(),
            index,
            source: error,
        }
    })
}

/// Handle `run-node <artifact> [index]` for a program that declares its
/// workflow in Rust.
///
/// `args` are the program arguments without the program name. Returns
/// `Ok(false)` when they are not a `run-node` invocation, so the program can
/// go on to build and execute the workflow itself:
///
/// ```rust,no_run
/// use batchflow::builder::WorkflowBuilder;
/// use batchflow::engine::runner;
///
/// let builder = WorkflowBuilder::new();
/// // declare nodes ...
/// let graph = builder.build();
/// if runner::dispatch(&graph, std::env::args().skip(1))? {
///     return Ok(());
/// }
/// # Ok::<(), batchflow::errors::ExecutionError>(())
/// ```
pub fn dispatch<I, S>(graph: &Graph, args: I) -> Result<bool, ExecutionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<S> = args.into_iter().collect();
    let Some((command, rest)) = args.split_first() else {
        return Ok(false);
    };
    if command.as_ref() != RUN_NODE_COMMAND {
        return Ok(false);
    }

    let (path, index) = match rest {
        [path] => (path.as_ref(), None),
        [path, index] => (path.as_ref(), Some(parse_index(path.as_ref(), index.as_ref())?)),
        _ => {
            return Err(ExecutionError::Artifact {
                path: rest.first().map(|p| p.as_ref()).unwrap_or_default().into(),
                reason: format!("usage: {RUN_NODE_COMMAND} <artifact> [index]"),
            })
        }
    };

    run_artifact(Some(graph), Path::new(path), index)?;
    Ok(true)
}

pub(crate) fn parse_index(path: &str, index: &str) -> Result<usize, ExecutionError> {
    index.trim().parse().map_err(|_| ExecutionError::Artifact {
        path: path.into(),
        reason: format!("invalid task index '{index}'"),
    })
}
