// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// A readiness predicate: true once a node's effect durably exists.
///
/// Implementations must be cheap and idempotent, and must return
/// `Ok(false)` for "not there yet". An `Err` is treated as a bug in the
/// predicate and aborts pruning.
pub trait Postcondition: Send + Sync {
    fn check(&self) -> anyhow::Result<bool>;

    /// Short human-readable description, used in logs and errors.
    fn describe(&self) -> String;
}
