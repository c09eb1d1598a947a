// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod generation;

pub use config::ConfigurationError;
pub use execution::ExecutionError;
pub use generation::GenerationError;

use thiserror::Error;

/// Umbrella error returned through [`crate::traits::WorkflowExecutor`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
