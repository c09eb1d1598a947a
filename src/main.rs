// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use batchflow::config::{load_and_validate_config, ExecutorKind, RuntimeBuilder, WorkflowConfig};
use batchflow::engine::runner;
use batchflow::observability::{init_tracing, level_for_verbosity};
use batchflow::traits::{RunSummary, WorkflowExecutor};

/// Declarative batch workflows: run locally or generate Slurm pipelines
#[derive(Parser, Debug)]
#[command(name = "batchflow")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute a workflow file
    Run(RunArgs),

    /// Show the execution order and which nodes would be skipped
    Plan {
        #[arg(value_name = "WORKFLOW")]
        workflow: PathBuf,
    },

    /// Check a workflow file for errors
    Validate {
        #[arg(value_name = "WORKFLOW")]
        workflow: PathBuf,
    },

    /// Invoke one serialized node (called by the generated runner stub)
    RunNode {
        #[arg(value_name = "ARTIFACT")]
        artifact: PathBuf,

        /// Fan-out index of this instance
        #[arg(value_name = "INDEX")]
        index: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    #[arg(value_name = "WORKFLOW")]
    workflow: PathBuf,

    /// Run in this process, whatever the file selects
    #[arg(long, conflicts_with = "slurm")]
    local: bool,

    /// Generate Slurm scripts, whatever the file selects
    #[arg(long)]
    slurm: bool,

    /// Where Slurm scripts are written (temporary directory by default)
    #[arg(long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Working directory of every Slurm job
    #[arg(long, value_name = "DIR")]
    base: Option<PathBuf>,

    /// Conda environment for nodes that do not name one
    #[arg(long, value_name = "NAME")]
    environment: Option<String>,

    /// Remove the generated directory afterwards
    #[arg(long)]
    cleanup: bool,

    /// Generate jobs for satisfied nodes too
    #[arg(long)]
    no_prune: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(level_for_verbosity(cli.verbose));

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Plan { workflow } => plan(&workflow),
        Commands::Validate { workflow } => {
            let cfg = load_and_validate_config(&workflow)?;
            println!("✅ {} is valid ({} nodes)", workflow.display(), cfg.nodes.len());
            Ok(())
        }
        Commands::RunNode { artifact, index } => {
            runner::run_artifact(None, &artifact, index)
                .with_context(|| format!("Failed to run {}", artifact.display()))
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut cfg = load_and_validate_config(&args.workflow)?;
    apply_overrides(&mut cfg, &args);

    let (graph, executor) = RuntimeBuilder::from_config(&cfg)?;
    let summary = executor
        .execute(&graph)
        .with_context(|| format!("Failed to execute {}", args.workflow.display()))?;
    report(executor.as_ref(), &summary);
    Ok(())
}

fn apply_overrides(cfg: &mut WorkflowConfig, args: &RunArgs) {
    if args.local {
        cfg.executor = ExecutorKind::Local;
    }
    if args.slurm {
        cfg.executor = ExecutorKind::Slurm;
    }

    let slurm = &mut cfg.slurm;
    if let Some(directory) = &args.directory {
        slurm.directory = Some(directory.clone());
    }
    if let Some(base) = &args.base {
        slurm.base = Some(base.clone());
    }
    if let Some(environment) = &args.environment {
        slurm.environment = Some(environment.clone());
    }
    slurm.cleanup |= args.cleanup;
    if args.no_prune {
        slurm.prune = false;
    }
}

fn report(executor: &dyn WorkflowExecutor, summary: &RunSummary) {
    let verb = if executor.name() == "local" {
        "Ran"
    } else {
        "Generated"
    };
    println!(
        "{} {} nodes ({} invocations), skipped {}",
        verb,
        summary.scheduled.len(),
        summary.invocations,
        summary.skipped.len()
    );
    if let Some(pipeline) = &summary.pipeline {
        println!("📄 Submit with: {}", pipeline.display());
    }
}

fn plan(workflow: &Path) -> Result<()> {
    let cfg = load_and_validate_config(workflow)?;
    let graph = RuntimeBuilder::build_graph(&cfg)?;
    let plan = graph.prune()?;

    println!("Execution plan for {}", workflow.display());
    for (position, id) in graph.bfs_order().into_iter().enumerate() {
        let node = &graph[id];
        let status = if plan.is_pending(id) { "pending" } else { "satisfied" };
        let tasks = if node.is_fan_out() {
            format!(" [{} tasks]", node.fan_out())
        } else {
            String::new()
        };
        println!("{:>3}. {:<9} {}{}", position + 1, status, node.name(), tasks);
    }

    if plan.is_empty() {
        println!("Nothing to do: every node is satisfied");
    }
    Ok(())
}
