// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative construction of a workflow graph.
//!
//! A [`WorkflowBuilder`] is created fresh for every run, collects the
//! declarations and hands the finished [`Graph`] to an executor. There is no
//! process-wide graph.
//!
//! # Example
//! ```rust
//! use batchflow::backends::{exists, indexed_fn, work_fn};
//! use batchflow::builder::WorkflowBuilder;
//!
//! let mut builder = WorkflowBuilder::new();
//! let main = builder.declare_root("main", work_fn(|| Ok(())))?;
//! builder.declare_postcondition(main, exists("data/train/simulations.npy"))?;
//!
//! let simulate = builder.declare_dependency("simulate", indexed_fn(|_block| Ok(())), main)?;
//! builder.declare_fan_out(simulate, 100)?;
//! builder.set_attribute(simulate, "--time", "00:30:00")?;
//!
//! let graph = builder.build();
//! assert_eq!(graph.len(), 2);
//! # Ok::<(), batchflow::errors::ConfigurationError>(())
//! ```

use std::sync::Arc;

use crate::errors::ConfigurationError;
use crate::graph::{Graph, Node, NodeId};
use crate::traits::{Postcondition, Work};

/// One or several upstream nodes.
pub trait Upstream {
    fn into_node_ids(self) -> Vec<NodeId>;
}

impl Upstream for NodeId {
    fn into_node_ids(self) -> Vec<NodeId> {
        vec![self]
    }
}

impl Upstream for Vec<NodeId> {
    fn into_node_ids(self) -> Vec<NodeId> {
        self
    }
}

impl Upstream for &[NodeId] {
    fn into_node_ids(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

impl<const N: usize> Upstream for [NodeId; N] {
    fn into_node_ids(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

#[derive(Debug, Default)]
pub struct WorkflowBuilder {
    graph: Graph,
}

impl WorkflowBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node without dependencies.
    ///
    /// Declaring the same name again with the same work unit returns the
    /// existing node; anything else is a conflicting declaration.
    pub fn declare_root(
        &mut self,
        name: impl Into<String>,
        work: Arc<dyn Work>,
    ) -> Result<NodeId, ConfigurationError> {
        let name = name.into();
        if let Some(existing) = self.redeclaration(&name, &work)? {
            if !self.graph[existing].is_root() {
                return Err(ConfigurationError::ConflictingDeclaration {
                    name,
                    field: "dependencies",
                });
            }
            return Ok(existing);
        }

        let id = self.graph.add_node(Node::new(name, work))?;
        tracing::debug!(node = self.graph[id].name(), "Declared root node");
        Ok(id)
    }

    /// Register a node that runs after `upstream`.
    ///
    /// Repeating the declaration with the same work unit adds the extra
    /// upstream nodes to the existing node, so dependencies can be attached
    /// one at a time. Either every extra edge is added or none is.
    pub fn declare_dependency(
        &mut self,
        name: impl Into<String>,
        work: Arc<dyn Work>,
        upstream: impl Upstream,
    ) -> Result<NodeId, ConfigurationError> {
        let name = name.into();
        let upstream = upstream.into_node_ids();
        for dependency in &upstream {
            if self.graph.get(*dependency).is_none() {
                return Err(ConfigurationError::UnknownDependency {
                    node: name,
                    missing_dependency: dependency.to_string(),
                });
            }
        }

        if let Some(existing) = self.redeclaration(&name, &work)? {
            self.graph.add_dependencies(existing, &upstream)?;
            return Ok(existing);
        }

        let id = self
            .graph
            .add_node(Node::new(name, work).with_dependencies(upstream))?;
        tracing::debug!(
            node = self.graph[id].name(),
            dependencies = self.graph[id].dependencies().len(),
            "Declared node"
        );
        Ok(id)
    }

    /// Add a dependency edge between two declared nodes.
    pub fn declare_edge(&mut self, node: NodeId, upstream: NodeId) -> Result<(), ConfigurationError> {
        self.graph.add_dependency(node, upstream)
    }

    /// Append a readiness predicate to a node.
    pub fn declare_postcondition(
        &mut self,
        node: NodeId,
        postcondition: Box<dyn Postcondition>,
    ) -> Result<(), ConfigurationError> {
        self.graph.get_mut(node)?.postconditions.push(postcondition);
        Ok(())
    }

    /// Run `count` indexed instances of the node's work.
    pub fn declare_fan_out(&mut self, node: NodeId, count: usize) -> Result<(), ConfigurationError> {
        let target = self.graph.get_mut(node)?;
        if count == 0 {
            return Err(ConfigurationError::InvalidFanOut {
                node: target.name.clone(),
                count,
            });
        }
        target.fan_out = count;
        Ok(())
    }

    /// Store a backend hint. Last write wins.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ConfigurationError> {
        self.graph
            .get_mut(node)?
            .attributes
            .insert(key.into(), value.into());
        Ok(())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn build(self) -> Graph {
        self.graph
    }

    fn redeclaration(
        &self,
        name: &str,
        work: &Arc<dyn Work>,
    ) -> Result<Option<NodeId>, ConfigurationError> {
        let Some(existing) = self.graph.id_of(name) else {
            return Ok(None);
        };
        if Arc::ptr_eq(&self.graph[existing].work, work) {
            Ok(Some(existing))
        } else {
            Err(ConfigurationError::ConflictingDeclaration {
                name: name.to_string(),
                field: "work",
            })
        }
    }
}
