// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod local;
pub mod runner;
pub mod slurm;

pub use factory::ExecutorFactory;
pub use local::LocalExecutor;
pub use slurm::SlurmExecutor;
