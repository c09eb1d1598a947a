// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Slurm script generation.
//!
//! Nothing runs here. The executor writes a directory that a user submits
//! with `./pipeline`:
//!
//! ```text
//! <directory>/
//!   <node>.code      serialized work reference (JSON)
//!   processor        runner stub: `exec <program> run-node "$@"`
//!   tasks/<node>     batch script, one per node
//!   pipeline         sbatch calls chained with --dependency=afterok
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::consts::{
    ARRAY_TASK_ID_VARIABLE, ARTIFACT_EXTENSION, DIRECTIVE_PREFIX, ENVIRONMENT_ATTRIBUTE,
    PIPELINE_FILE, PROCESSOR_FILE, RUN_NODE_COMMAND, TASKS_DIRECTORY,
};
use crate::config::SlurmOptions;
use crate::engine::runner::WorkArtifact;
use crate::errors::{GenerationError, WorkflowError};
use crate::graph::{ExecutionPlan, Graph, Node, NodeId};
use crate::observability::messages::generation::{
    CleanupFailed, CleanupRequested, FileWritten, GenerationCompleted, GenerationStarted, NodeOmitted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{RunSummary, WorkflowExecutor};

/// Generates Slurm batch scripts for a workflow.
#[derive(Debug, Clone, Default)]
pub struct SlurmExecutor {
    options: SlurmOptions,
}

impl SlurmExecutor {
    pub fn new(options: SlurmOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SlurmOptions {
        &self.options
    }

    /// Write the script tree for `graph`.
    ///
    /// With `cleanup` set the directory is removed afterwards, whether
    /// generation succeeded or not. A failed removal is only reported as
    /// [`GenerationError::Cleanup`] when generation itself succeeded.
    pub fn generate(&self, graph: &Graph) -> Result<RunSummary, GenerationError> {
        let plan = if self.options.prune {
            graph.prune()?
        } else {
            ExecutionPlan::everything(graph)
        };

        let directory = self.prepare_directory()?;
        let result = self.write_tree(graph, &plan, &directory);

        if self.options.cleanup {
            CleanupRequested {
                directory: &directory,
            }
            .log();
            let removed = fs::remove_dir_all(&directory);
            return match (result, removed) {
                (Ok(summary), Ok(())) => Ok(RunSummary {
                    pipeline: None,
                    ..summary
                }),
                (Ok(_), Err(source)) => Err(GenerationError::Cleanup {
                    path: directory,
                    source,
                }),
                (Err(error), Ok(())) => Err(error),
                (Err(error), Err(cleanup)) => {
                    CleanupFailed {
                        directory: &directory,
                        error: &cleanup,
                    }
                    .log();
                    Err(error)
                }
            };
        }
        result
    }

    /// Attributes of `node` with the backend defaults filled in.
    ///
    /// Attributes the caller set are never overridden.
    pub fn effective_attributes(&self, node: &Node) -> BTreeMap<String, String> {
        let mut attributes = node.attributes().clone();
        let mut fill = |key: &str, value: String| {
            attributes.entry(key.to_string()).or_insert(value);
        };

        fill("--export", "ALL".to_string());
        fill("--parsable", String::new());
        fill("--requeue", String::new());
        if let Some(base) = &self.options.base {
            fill("--chdir", base.display().to_string());
        }
        if let Some(environment) = &self.options.environment {
            fill(ENVIRONMENT_ATTRIBUTE, environment.clone());
        }
        attributes
    }

    fn prepare_directory(&self) -> Result<PathBuf, GenerationError> {
        let directory = match &self.options.directory {
            Some(directory) => {
                fs::create_dir_all(directory).map_err(|source| GenerationError::CreateDirectory {
                    path: directory.clone(),
                    source,
                })?;
                directory.clone()
            }
            None => tempfile::Builder::new()
                .prefix("batchflow-")
                .tempdir()
                .map_err(|source| GenerationError::CreateDirectory {
                    path: std::env::temp_dir(),
                    source,
                })?
                .keep(),
        };

        // Jobs may change directory (--chdir), so scripts refer to absolute paths
        fs::canonicalize(&directory).map_err(|source| GenerationError::CreateDirectory {
            path: directory,
            source,
        })
    }

    fn write_tree(
        &self,
        graph: &Graph,
        plan: &ExecutionPlan,
        directory: &Path,
    ) -> Result<RunSummary, GenerationError> {
        let started = Instant::now();
        GenerationStarted {
            directory,
            nodes: plan.len(),
            skipped: plan.satisfied().len(),
        }
        .log();
        for &id in plan.satisfied() {
            NodeOmitted {
                node: graph[id].name(),
            }
            .log();
        }

        let tasks = directory.join(TASKS_DIRECTORY);
        fs::create_dir_all(&tasks).map_err(|source| GenerationError::CreateDirectory {
            path: tasks.clone(),
            source,
        })?;

        let processor = directory.join(PROCESSOR_FILE);
        write_file(&processor, &render_processor(&self.runner()?), true)?;
        FileWritten {
            kind: "runner stub",
            node: None,
            path: &processor,
        }
        .log();

        let mut summary = RunSummary::default();
        for &id in plan.order() {
            let node = &graph[id];

            let artifact = artifact_path(directory, node.name());
            let contents = serde_json::to_string_pretty(&WorkArtifact {
                node: node.name().to_string(),
                fan_out: node.fan_out(),
                work: node.work().spec(node.name()),
            })
            .map_err(|source| GenerationError::Serialize {
                node: node.name().to_string(),
                source,
            })?;
            write_file(&artifact, &contents, false)?;
            FileWritten {
                kind: "work artifact",
                node: Some(node.name()),
                path: &artifact,
            }
            .log();

            let script = tasks.join(node.name());
            let attributes = self.effective_attributes(node);
            write_file(
                &script,
                &render_task_script(node, &attributes, &processor, &artifact),
                true,
            )?;
            FileWritten {
                kind: "task script",
                node: Some(node.name()),
                path: &script,
            }
            .log();

            summary.scheduled.push(node.name().to_string());
            summary.invocations += node.fan_out();
        }
        summary.skipped = plan
            .satisfied()
            .iter()
            .map(|id| graph[*id].name().to_string())
            .collect();

        let pipeline = directory.join(PIPELINE_FILE);
        write_file(&pipeline, &render_pipeline(graph, plan), true)?;
        GenerationCompleted {
            pipeline: &pipeline,
            submissions: plan.len(),
            duration: started.elapsed(),
        }
        .log();

        summary.pipeline = Some(pipeline);
        Ok(summary)
    }

    fn runner(&self) -> Result<Vec<String>, GenerationError> {
        if let Some(runner) = &self.options.runner {
            return Ok(runner.clone());
        }
        let program = std::env::current_exe().map_err(GenerationError::CurrentExe)?;
        Ok(vec![
            program.display().to_string(),
            RUN_NODE_COMMAND.to_string(),
        ])
    }
}

impl WorkflowExecutor for SlurmExecutor {
    fn execute(&self, graph: &Graph) -> Result<RunSummary, WorkflowError> {
        Ok(self.generate(graph)?)
    }

    fn name(&self) -> &'static str {
        "slurm"
    }
}

fn artifact_path(directory: &Path, node: &str) -> PathBuf {
    directory.join(format!("{node}.{ARTIFACT_EXTENSION}"))
}

/// The shared stub every job runs.
pub fn render_processor(runner: &[String]) -> String {
    let command: Vec<String> = runner.iter().map(|arg| quote(arg)).collect();
    format!(
        "#!/bin/bash\n# Runner stub generated by batchflow\n# usage: processor <artifact> [index]\nexec {} \"$@\"\n",
        command.join(" ")
    )
}

/// Batch script of one node.
pub fn render_task_script(
    node: &Node,
    attributes: &BTreeMap<String, String>,
    processor: &Path,
    artifact: &Path,
) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        format!("# Generated by batchflow for node '{}'", node.name()),
    ];

    for (key, value) in attributes {
        if !key.starts_with(DIRECTIVE_PREFIX) {
            continue;
        }
        if value.is_empty() {
            lines.push(format!("#SBATCH {key}"));
        } else {
            lines.push(format!("#SBATCH {key}={value}"));
        }
    }
    if node.is_fan_out() {
        lines.push(format!("#SBATCH --array 0-{}", node.fan_out() - 1));
    }

    if let Some(environment) = attributes.get(ENVIRONMENT_ATTRIBUTE) {
        lines.push("eval \"$(conda shell.bash hook)\"".to_string());
        lines.push(format!("conda activate {}", quote(environment)));
    }

    let mut invocation = format!(
        "{} {}",
        quote(&processor.display().to_string()),
        quote(&artifact.display().to_string())
    );
    if node.is_fan_out() {
        invocation.push(' ');
        invocation.push_str(ARRAY_TASK_ID_VARIABLE);
    }
    lines.push(invocation);

    lines.join("\n") + "\n"
}

/// Submission script for the pending nodes of `plan`, in plan order.
///
/// Job ids are captured as `t<position>`; dependencies on satisfied nodes
/// are dropped.
pub fn render_pipeline(graph: &Graph, plan: &ExecutionPlan) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        "# Generated by batchflow: submits every job in dependency order".to_string(),
        "set -e".to_string(),
        "cd \"$(dirname \"$0\")\"".to_string(),
    ];

    let mut variables: HashMap<NodeId, String> = HashMap::new();
    for (position, &id) in plan.order().iter().enumerate() {
        let variable = format!("t{position}");
        let after: Vec<String> = plan
            .pending_dependencies(graph, id)
            .filter_map(|dependency| variables.get(&dependency))
            .map(|upstream| format!("${upstream}"))
            .collect();

        let dependency = if after.is_empty() {
            String::new()
        } else {
            format!("--dependency=afterok:{} ", after.join(":"))
        };
        let script = format!("{TASKS_DIRECTORY}/{}", graph[id].name());
        lines.push(format!("{variable}=$(sbatch {dependency}{})", quote(&script)));
        variables.insert(id, variable);
    }

    lines.join("\n") + "\n"
}

fn write_file(path: &Path, contents: &str, executable: bool) -> Result<(), GenerationError> {
    let write_error = |source| GenerationError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    fs::write(path, contents).map_err(write_error)?;
    if executable {
        make_executable(path).map_err(write_error)?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Single-quote `value` for the shell unless it is plainly safe.
fn quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
