// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
pub mod loader;
mod options;
mod runtime;
mod validation;

pub use loader::{
    load_and_validate_config, load_config, ConfigFormat, ExecutorKind, NodeConfig,
    PostconditionConfig, WorkflowConfig,
};
pub use options::SlurmOptions;
pub use runtime::RuntimeBuilder;
pub use validation::validate_workflow;
