// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Whether a work unit wants the fan-out index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Called without arguments
    Nullary,
    /// Called with the index of its fan-out instance
    Indexed,
}

/// Serializable reference to a unit of work.
///
/// This is what the Slurm backend writes into `<node>.code` and what the
/// runner stub reads back in the batch job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkSpec {
    /// A self-contained shell command
    Shell { command: String },
    /// Work that lives in the declaring program, looked up by node name
    Registered { name: String },
}

/// A unit of deferred work attached to a node.
///
/// The engine never looks inside a work unit: it only invokes it, passing
/// the fan-out index when there is one.
pub trait Work: Send + Sync {
    /// Run the work once. `index` is `Some` for every fan-out instance.
    fn invoke(&self, index: Option<usize>) -> anyhow::Result<()>;

    fn arity(&self) -> Arity {
        Arity::Nullary
    }

    /// Reference used to ship this work to another process.
    fn spec(&self, node: &str) -> WorkSpec {
        WorkSpec::Registered {
            name: node.to_string(),
        }
    }
}

/// Index to hand to a work unit when the node runs a single instance.
pub(crate) fn single_instance_index(work: &dyn Work) -> Option<usize> {
    match work.arity() {
        Arity::Nullary => None,
        Arity::Indexed => Some(0),
    }
}
