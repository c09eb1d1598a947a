// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Attributes whose key starts with this marker become `#SBATCH` directives
pub const DIRECTIVE_PREFIX: &str = "--";
/// Attribute naming the conda environment to activate in the batch job
pub const ENVIRONMENT_ATTRIBUTE: &str = "conda";

/// Subdirectory of the generation directory holding per-node scripts
pub const TASKS_DIRECTORY: &str = "tasks";
/// Top-level submission script
pub const PIPELINE_FILE: &str = "pipeline";
/// Runner stub shared by every node
pub const PROCESSOR_FILE: &str = "processor";
/// Extension of serialized work artifacts (`<node>.code`)
pub const ARTIFACT_EXTENSION: &str = "code";

/// Subcommand the runner stub invokes on the runner program
pub const RUN_NODE_COMMAND: &str = "run-node";
/// Per-instance index variable set by Slurm for array jobs
pub const ARRAY_TASK_ID_VARIABLE: &str = "$SLURM_ARRAY_TASK_ID";

/// Fan-out of a node that does not declare one
pub const DEFAULT_TASKS: usize = 1;
