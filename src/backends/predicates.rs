// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::traits::Postcondition;

/// Holds once `path` exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exists {
    path: PathBuf,
}

impl Exists {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Postcondition for Exists {
    fn check(&self) -> anyhow::Result<bool> {
        // Missing files are `Ok(false)`; permission problems are real errors.
        self.path
            .try_exists()
            .with_context(|| format!("cannot stat '{}'", self.path.display()))
    }

    fn describe(&self) -> String {
        format!("exists({})", self.path.display())
    }
}

/// The canonical postcondition: `path` exists.
pub fn exists(path: impl Into<PathBuf>) -> Box<dyn Postcondition> {
    Box::new(Exists::new(path))
}

/// Postcondition backed by a closure.
pub struct FnPostcondition<F> {
    description: String,
    f: F,
}

impl<F> Postcondition for FnPostcondition<F>
where
    F: Fn() -> anyhow::Result<bool> + Send + Sync,
{
    fn check(&self) -> anyhow::Result<bool> {
        (self.f)()
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

pub fn predicate<F>(description: impl Into<String>, f: F) -> Box<dyn Postcondition>
where
    F: Fn() -> anyhow::Result<bool> + Send + Sync + 'static,
{
    Box::new(FnPostcondition {
        description: description.into(),
        f,
    })
}
