// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // work units and postconditions
pub mod builder;    // declarative workflow construction
pub mod config;     // workflow files + executor options
pub mod engine;     // local and Slurm executors, runner
pub mod errors;     // error handling
pub mod graph;      // nodes, ordering, pruning
pub mod observability;
pub mod traits;     // unified abstractions
