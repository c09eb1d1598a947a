// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Usage Pattern
//!
//! ```rust
//! use batchflow::observability::messages::engine::NodeStarted;
//! use batchflow::observability::messages::StructuredLog;
//!
//! let msg = NodeStarted {
//!     node: "simulate",
//!     fan_out: 100,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod generation;
pub mod graph;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a single event.
    fn log(&self);

    /// Open a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
