// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Work units and postconditions that nodes are declared with.
//!
//! # Available Backends
//!
//! ## Closures
//! In-process Rust functions, see [`work_fn`] and [`indexed_fn`]. They cannot be
//! serialized, so a Slurm job reaches them by re-declaring the workflow in the
//! runner program (see [`crate::engine::runner::dispatch`]).
//!
//! ## Shell
//! Commands run through `sh -c`, see [`shell`]. Self-contained: the Slurm
//! runner needs nothing but the generated artifact.
//!
//! ## Predicates
//! Postconditions used for pruning: [`exists`] and arbitrary [`predicate`]s.
//!
//! ## Stub Backend (Test-Only)
//! Recording and failing work units plus switchable postconditions. NOT
//! available in production builds.

pub mod closure;
pub mod factory;
pub mod predicates;
pub mod shell;
#[cfg(test)]
pub mod stub;

pub use closure::{indexed_fn, work_fn, FnWork};
pub use factory::WorkFactory;
pub use predicates::{exists, predicate, Exists, FnPostcondition};
pub use shell::{shell, ShellWork};
