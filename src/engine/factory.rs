// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{ExecutorKind, WorkflowConfig};
use crate::engine::local::LocalExecutor;
use crate::engine::slurm::SlurmExecutor;
use crate::traits::WorkflowExecutor;

pub struct ExecutorFactory;

impl ExecutorFactory {
    pub fn from_config(cfg: &WorkflowConfig) -> Box<dyn WorkflowExecutor> {
        match cfg.executor {
            ExecutorKind::Local => Box::new(LocalExecutor::new()),
            ExecutorKind::Slurm => Box::new(SlurmExecutor::new(cfg.slurm.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::{parse_config, ConfigFormat};

    #[test]
    fn test_executor_selection() {
        let cases = [
            ("nodes: []", "local"),
            ("executor: local\nnodes: []", "local"),
            ("executor: slurm\nnodes: []", "slurm"),
        ];
        for (yaml, expected) in cases {
            let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();
            assert_eq!(ExecutorFactory::from_config(&cfg).name(), expected, "{yaml}");
        }
    }
}
