// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::process::Command;
use std::sync::Arc;

use anyhow::{bail, Context};

use crate::traits::{Arity, Work, WorkSpec};

/// Placeholder replaced by the fan-out index.
pub const INDEX_PLACEHOLDER: &str = "{index}";
/// Environment variable carrying the fan-out index.
pub const INDEX_ENV: &str = "BATCHFLOW_TASK_INDEX";

/// Runs a command through `sh -c`. A non-zero exit status is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellWork {
    command: String,
}

impl ShellWork {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The command line for one instance.
    pub fn render(&self, index: Option<usize>) -> String {
        match index {
            Some(index) => self.command.replace(INDEX_PLACEHOLDER, &index.to_string()),
            None => self.command.clone(),
        }
    }
}

impl Work for ShellWork {
    fn invoke(&self, index: Option<usize>) -> anyhow::Result<()> {
        let command = self.render(index);
        let mut process = Command::new("sh");
        process.arg("-c").arg(&command);
        if let Some(index) = index {
            process.env(INDEX_ENV, index.to_string());
        }

        let status = process
            .status()
            .with_context(|| format!("failed to spawn `{command}`"))?;
        if !status.success() {
            bail!("`{command}` exited with {status}");
        }
        Ok(())
    }

    fn arity(&self) -> Arity {
        if self.command.contains(INDEX_PLACEHOLDER) {
            Arity::Indexed
        } else {
            Arity::Nullary
        }
    }

    fn spec(&self, _node: &str) -> WorkSpec {
        WorkSpec::Shell {
            command: self.command.clone(),
        }
    }
}

/// Work unit running `command` in a shell.
pub fn shell(command: impl Into<String>) -> Arc<dyn Work> {
    Arc::new(ShellWork::new(command))
}
