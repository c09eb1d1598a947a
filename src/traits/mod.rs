// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod executor;
pub mod postcondition;
pub mod work;

pub use executor::{RunSummary, WorkflowExecutor};
pub use postcondition::Postcondition;
pub use work::{Arity, Work, WorkSpec};
