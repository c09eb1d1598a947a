// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::backends::predicates::exists;
use crate::backends::shell::shell;
use crate::config::{NodeConfig, PostconditionConfig};
use crate::traits::{Postcondition, Work};

/// Creates work units and postconditions from workflow file declarations.
pub struct WorkFactory;

impl WorkFactory {
    pub fn create_work(node: &NodeConfig) -> Arc<dyn Work> {
        shell(node.command.as_str())
    }

    pub fn create_postcondition(postcondition: &PostconditionConfig) -> Box<dyn Postcondition> {
        match postcondition {
            PostconditionConfig::Exists { exists: path } => exists(path.clone()),
        }
    }
}
