// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::path::PathBuf;

/// Configuration of the Slurm backend.
///
/// # Fields
/// * `directory` - Where scripts and artifacts are generated (temporary directory when unset)
/// * `base` - Working directory of every job (`--chdir`)
/// * `environment` - Conda environment activated by nodes that do not name one
/// * `cleanup` - Remove the generation directory once written
/// * `prune` - Skip nodes whose postconditions already hold (defaults to true)
/// * `runner` - Program and leading arguments the runner stub calls
///   (defaults to the current executable followed by `run-node`)
///
/// # Example
/// ```yaml
/// slurm:
///   directory: build/slurm
///   base: /scratch/project
///   environment: sbi
///   cleanup: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlurmOptions {
    pub directory: Option<PathBuf>,
    pub base: Option<PathBuf>,
    pub environment: Option<String>,
    pub cleanup: bool,
    pub prune: bool,
    pub runner: Option<Vec<String>>,
}

impl Default for SlurmOptions {
    fn default() -> Self {
        Self {
            directory: None,
            base: None,
            environment: None,
            cleanup: false,
            prune: true,
            runner: None,
        }
    }
}

impl SlurmOptions {
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }

    pub fn with_runner<I, S>(mut self, runner: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runner = Some(runner.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SlurmOptions::default();
        assert!(options.prune);
        assert!(!options.cleanup);
        assert!(options.directory.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let options: SlurmOptions = serde_yaml::from_str("environment: sbi\ncleanup: true\n").unwrap();
        assert_eq!(options.environment.as_deref(), Some("sbi"));
        assert!(options.cleanup);
        assert!(options.prune);
    }
}
