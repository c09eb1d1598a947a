// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types follow a struct-based pattern: each event is a small struct
//! with a `Display` implementation and a [`messages::StructuredLog`]
//! implementation that emits it with structured fields at a fixed level.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::graph` - pruning decisions
//! * `messages::engine` - local run lifecycle and node invocations
//! * `messages::generation` - Slurm script generation
//! * `messages::validation` - workflow file validation
//!
//! The library only emits events. Binaries install a subscriber with
//! [`init_tracing`].

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber for the CLI.
///
/// `RUST_LOG` takes precedence over `default_level` when it is set.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("batchflow={default_level},{default_level}")));

    // A second initialization (tests, embedding programs) is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Map a `-v` count to a level name.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "info");
        assert_eq!(level_for_verbosity(1), "debug");
        assert_eq!(level_for_verbosity(5), "trace");
    }
}
