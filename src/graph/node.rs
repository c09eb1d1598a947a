// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::ConfigurationError;
use crate::traits::{Postcondition, Work};

/// Handle to a node inside the graph that declared it.
///
/// `index` is the declaration index, which is also the tie-breaker for
/// [`crate::graph::Graph::bfs_order`]. `graph` identifies the owning graph, so
/// a handle from another graph is never mistaken for a local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) graph: u64,
    pub(crate) index: usize,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Reject names that cannot serve as a file name in the generation directory.
pub(crate) fn check_name(name: &str) -> Result<(), ConfigurationError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name == "." || name == ".." {
        "must not be '.' or '..'"
    } else if name.contains(['/', '\\', '\0']) {
        "must not contain path separators or NUL"
    } else {
        return Ok(());
    };
    Err(ConfigurationError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

/// A named unit of deferred work.
pub struct Node {
    pub(crate) name: String,
    pub(crate) work: Arc<dyn Work>,
    pub(crate) fan_out: usize,
    pub(crate) dependencies: Vec<NodeId>,
    pub(crate) postconditions: Vec<Box<dyn Postcondition>>,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl Node {
    /// A single-instance node with no dependencies, postconditions or attributes.
    pub fn new(name: impl Into<String>, work: Arc<dyn Work>) -> Self {
        Self {
            name: name.into(),
            work,
            fan_out: 1,
            dependencies: Vec::new(),
            postconditions: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = NodeId>) -> Self {
        for dependency in dependencies {
            if !self.dependencies.contains(&dependency) {
                self.dependencies.push(dependency);
            }
        }
        self
    }

    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn with_postcondition(mut self, postcondition: Box<dyn Postcondition>) -> Self {
        self.postconditions.push(postcondition);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn work(&self) -> &Arc<dyn Work> {
        &self.work
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    pub fn is_fan_out(&self) -> bool {
        self.fan_out > 1
    }

    pub fn dependencies(&self) -> &[NodeId] {
        &self.dependencies
    }

    pub fn is_root(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn postconditions(&self) -> &[Box<dyn Postcondition>] {
        &self.postconditions
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// A node is satisfied when it has postconditions and all of them hold.
    ///
    /// Every predicate is evaluated, so a failing predicate is reported even
    /// when an earlier one already returned false.
    pub fn is_satisfied(&self) -> Result<bool, ConfigurationError> {
        if self.postconditions.is_empty() {
            return Ok(false);
        }

        let mut satisfied = true;
        for postcondition in &self.postconditions {
            let holds = postcondition
                .check()
                .map_err(|source| ConfigurationError::Postcondition {
                    node: self.name.clone(),
                    postcondition: postcondition.describe(),
                    source,
                })?;
            satisfied &= holds;
        }
        Ok(satisfied)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("fan_out", &self.fan_out)
            .field("dependencies", &self.dependencies)
            .field(
                "postconditions",
                &self
                    .postconditions
                    .iter()
                    .map(|p| p.describe())
                    .collect::<Vec<_>>(),
            )
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FailingPostcondition, FixedPostcondition, RecordingWork};

    fn node(name: &str) -> Node {
        Node::new(name, Arc::new(RecordingWork::new()))
    }

    #[test]
    fn test_node_without_postconditions_is_never_satisfied() {
        assert!(!node("a").is_satisfied().unwrap());
    }

    #[test]
    fn test_satisfied_requires_every_postcondition() {
        let all_true = node("a")
            .with_postcondition(Box::new(FixedPostcondition::new(true)))
            .with_postcondition(Box::new(FixedPostcondition::new(true)));
        assert!(all_true.is_satisfied().unwrap());

        let one_false = node("b")
            .with_postcondition(Box::new(FixedPostcondition::new(true)))
            .with_postcondition(Box::new(FixedPostcondition::new(false)));
        assert!(!one_false.is_satisfied().unwrap());
    }

    #[test]
    fn test_failing_postcondition_surfaces_as_configuration_error() {
        let n = node("broken")
            .with_postcondition(Box::new(FixedPostcondition::new(false)))
            .with_postcondition(Box::new(FailingPostcondition));
        let err = n.is_satisfied().unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Postcondition { ref node, .. } if node == "broken"
        ));
    }

    #[test]
    fn test_with_dependencies_deduplicates() {
        let id = |index| NodeId { graph: 0, index };
        let n = node("a").with_dependencies([id(0), id(1), id(0)]);
        assert_eq!(n.dependencies(), &[id(0), id(1)]);
        assert!(!n.is_root());
    }

    #[test]
    fn test_check_name() {
        for name in ["main", "simulate_train", "merge-test.v2", "a b"] {
            assert!(check_name(name).is_ok(), "{name} should be accepted");
        }
        for name in ["", ".", "..", "data/train", "/abs", "back\\slash", "nul\0"] {
            let err = check_name(name).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidName { name: ref n, .. } if n == name),
                "{name:?} should be rejected"
            );
        }
    }
}
