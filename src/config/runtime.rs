// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::WorkFactory;
use crate::builder::WorkflowBuilder;
use crate::config::WorkflowConfig;
use crate::engine::factory::ExecutorFactory;
use crate::errors::ConfigurationError;
use crate::graph::{Graph, NodeId};
use crate::traits::WorkflowExecutor;

/// Turns a workflow file into a graph and the executor that consumes it.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(
        cfg: &WorkflowConfig,
    ) -> Result<(Graph, Box<dyn WorkflowExecutor>), ConfigurationError> {
        let graph = Self::build_graph(cfg)?;
        let executor = ExecutorFactory::from_config(cfg);
        Ok((graph, executor))
    }

    /// Declare every node first, then the edges, so a node may list
    /// dependencies declared further down the file.
    pub fn build_graph(cfg: &WorkflowConfig) -> Result<Graph, ConfigurationError> {
        let mut builder = WorkflowBuilder::new();

        let mut ids = Vec::with_capacity(cfg.nodes.len());
        for node in &cfg.nodes {
            let id = builder.declare_root(node.name.as_str(), WorkFactory::create_work(node))?;
            builder.declare_fan_out(id, node.tasks)?;
            for postcondition in &node.postconditions {
                builder.declare_postcondition(id, WorkFactory::create_postcondition(postcondition))?;
            }
            for (key, value) in &node.attributes {
                builder.set_attribute(id, key.as_str(), value.as_str())?;
            }
            ids.push(id);
        }

        for (node, &id) in cfg.nodes.iter().zip(&ids) {
            for dependency in &node.depends_on {
                let upstream: NodeId = builder.graph().id_of(dependency).ok_or_else(|| {
                    ConfigurationError::UnknownDependency {
                        node: node.name.clone(),
                        missing_dependency: dependency.clone(),
                    }
                })?;
                builder.declare_edge(id, upstream)?;
            }
        }

        Ok(builder.build())
    }
}
