// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Simulation pipeline demo.
//!
//! Creates batched simulations for a train and a test dataset, then merges
//! the blocks of each. Running it a second time is much shorter: the merged
//! files already exist, so their postconditions prune everything.
//!
//! ```text
//! cargo run --example simulate -- --local
//! cargo run --example simulate -- --slurm --directory build/slurm
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use batchflow::backends::{exists, indexed_fn, work_fn};
use batchflow::builder::WorkflowBuilder;
use batchflow::config::consts::RUN_NODE_COMMAND;
use batchflow::config::SlurmOptions;
use batchflow::engine::{runner, LocalExecutor, SlurmExecutor};
use batchflow::graph::{Graph, NodeId};
use batchflow::observability::init_tracing;
use batchflow::traits::WorkflowExecutor;

#[derive(Parser, Debug, Clone)]
#[command(name = "simulate")]
struct Args {
    /// Simulations per block
    #[arg(long, default_value_t = 10_000)]
    batch_size: usize,

    /// Total number of training simulations
    #[arg(long, default_value_t = 1_000_000)]
    train: usize,

    /// Total number of test simulations
    #[arg(long, default_value_t = 100_000)]
    test: usize,

    /// Execute the workflow in this process
    #[arg(long)]
    local: bool,

    /// Generate a Slurm pipeline
    #[arg(long)]
    slurm: bool,

    /// Where the Slurm pipeline is written
    #[arg(long)]
    directory: Option<PathBuf>,

    /// `run-node <artifact> [index]` when started by the runner stub
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    rest: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing("info");
    let args = Args::parse();
    let graph = declare(&args)?;

    if runner::dispatch(&graph, &args.rest)? {
        return Ok(());
    }

    let executor: Box<dyn WorkflowExecutor> = if args.slurm {
        Box::new(SlurmExecutor::new(slurm_options(&args)?))
    } else if args.local {
        Box::new(LocalExecutor::new())
    } else {
        println!("Nothing to do, pass --local or --slurm");
        return Ok(());
    };

    let summary = executor.execute(&graph)?;
    println!(
        "{} nodes scheduled, {} already satisfied",
        summary.scheduled.len(),
        summary.skipped.len()
    );
    if let Some(pipeline) = summary.pipeline {
        println!("Submit with: {}", pipeline.display());
    }
    Ok(())
}

fn declare(args: &Args) -> Result<Graph> {
    let mut builder = WorkflowBuilder::new();

    let main = builder.declare_root(
        "main",
        work_fn(|| {
            fs::create_dir_all("data/train")?;
            fs::create_dir_all("data/test")?;
            Ok(())
        }),
    )?;
    builder.declare_postcondition(main, exists("data/train/simulations.csv"))?;
    builder.declare_postcondition(main, exists("data/test/simulations.csv"))?;

    dataset(&mut builder, main, "train", args.train / args.batch_size, args.batch_size)?;
    dataset(&mut builder, main, "test", args.test / args.batch_size, args.batch_size)?;

    Ok(builder.build())
}

fn dataset(
    builder: &mut WorkflowBuilder,
    main: NodeId,
    name: &str,
    blocks: usize,
    batch_size: usize,
) -> Result<()> {
    let directory = PathBuf::from("data").join(name);

    let simulate_dir = directory.clone();
    let simulate = builder.declare_dependency(
        format!("simulate_{name}"),
        indexed_fn(move |block| simulate_block(&simulate_dir, block, batch_size)),
        main,
    )?;
    builder.declare_fan_out(simulate, blocks.max(1))?;
    builder.set_attribute(simulate, "--time", "00:15:00")?;

    let merged = directory.join("simulations.csv");
    let merge_dir = directory.clone();
    let merge = builder.declare_dependency(
        format!("merge_{name}"),
        work_fn(move || merge_blocks(&merge_dir)),
        simulate,
    )?;
    builder.declare_postcondition(merge, exists(merged))?;
    builder.set_attribute(merge, "--mem", "8G")?;
    Ok(())
}

fn simulate_block(directory: &Path, block: usize, batch_size: usize) -> Result<()> {
    tracing::info!(directory = %directory.display(), block, "Simulating block");
    let output = directory.join(format!("block-{block:05}.csv"));
    if output.exists() {
        return Ok(());
    }

    let mut file = fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    // Cheap deterministic stand-in for a simulator
    let mut state = (block as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    for _ in 0..batch_size {
        let row: Vec<String> = (0..5)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                format!("{:.6}", (state >> 11) as f64 / (1u64 << 53) as f64)
            })
            .collect();
        writeln!(file, "{}", row.join(","))?;
    }
    Ok(())
}

fn merge_blocks(directory: &Path) -> Result<()> {
    tracing::info!(directory = %directory.display(), "Merging blocks");
    let mut blocks: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("block-"))
        })
        .collect();
    blocks.sort();

    let mut merged = String::new();
    for block in &blocks {
        merged.push_str(&fs::read_to_string(block)?);
    }
    fs::write(directory.join("simulations.csv"), merged)?;
    for block in &blocks {
        fs::remove_file(block)?;
    }
    Ok(())
}

fn slurm_options(args: &Args) -> Result<SlurmOptions> {
    let program = std::env::current_exe()?;
    let mut runner = vec![
        program.display().to_string(),
        format!("--batch-size={}", args.batch_size),
        format!("--train={}", args.train),
        format!("--test={}", args.test),
    ];
    runner.push(RUN_NODE_COMMAND.to_string());

    let mut options = SlurmOptions::default()
        .with_base(std::env::current_dir()?)
        .with_runner(runner);
    if let Some(directory) = &args.directory {
        options = options.with_directory(directory);
    }
    Ok(options)
}
