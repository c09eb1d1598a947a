// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of workflow files before a graph is built from them.
//!
//! Graphs built through [`crate::builder::WorkflowBuilder`] are checked one
//! declaration at a time. A workflow file is checked as a whole instead, so
//! every problem can be reported at once:
//!
//! 1. **Names**: node names are unique and usable as file names
//! 2. **Fan-out**: every `tasks` count is at least 1
//! 3. **References**: every `depends_on` entry names a declared node
//! 4. **Cycles**: DFS with a recursion stack, reporting the cycle path
//!
//! Cycle detection only runs when the references resolve, since it needs a
//! complete adjacency list.

use std::collections::{HashMap, HashSet};

use crate::config::WorkflowConfig;
use crate::errors::ConfigurationError;
use crate::graph::check_name;
use crate::observability::messages::validation::{
    ValidationCompleted, ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;

/// Validate a workflow file's node declarations.
///
/// # Returns
///
/// * `Ok(())` - The workflow can be turned into a graph
/// * `Err(Vec<ConfigurationError>)` - Every problem found
pub fn validate_workflow(config: &WorkflowConfig) -> Result<(), Vec<ConfigurationError>> {
    ValidationStarted {
        node_count: config.nodes.len(),
    }
    .log();

    let mut errors = Vec::new();
    errors.extend(
        config
            .nodes
            .iter()
            .filter_map(|node| check_name(&node.name).err()),
    );
    errors.extend(validate_unique_names(config));
    errors.extend(validate_fan_out(config));
    errors.extend(validate_dependency_references(config));

    if errors.is_empty() {
        if let Some(cycle) = find_cycle(config) {
            errors.push(ConfigurationError::CyclicDependency { cycle });
        }
    }

    if errors.is_empty() {
        ValidationCompleted {
            node_count: config.nodes.len(),
            edge_count: config.nodes.iter().map(|n| n.depends_on.len()).sum(),
        }
        .log();
        Ok(())
    } else {
        for error in &errors {
            ValidationFailed { error }.log();
        }
        Err(errors)
    }
}

fn validate_unique_names(config: &WorkflowConfig) -> Vec<ConfigurationError> {
    let mut seen = HashSet::new();
    config
        .nodes
        .iter()
        .filter(|node| !seen.insert(node.name.as_str()))
        .map(|node| ConfigurationError::DuplicateName {
            name: node.name.clone(),
        })
        .collect()
}

fn validate_fan_out(config: &WorkflowConfig) -> Vec<ConfigurationError> {
    config
        .nodes
        .iter()
        .filter(|node| node.tasks == 0)
        .map(|node| ConfigurationError::InvalidFanOut {
            node: node.name.clone(),
            count: node.tasks,
        })
        .collect()
}

fn validate_dependency_references(config: &WorkflowConfig) -> Vec<ConfigurationError> {
    let names: HashSet<&str> = config.nodes.iter().map(|n| n.name.as_str()).collect();
    let mut errors = Vec::new();

    for node in &config.nodes {
        for dependency in &node.depends_on {
            if !names.contains(dependency.as_str()) {
                errors.push(ConfigurationError::UnknownDependency {
                    node: node.name.clone(),
                    missing_dependency: dependency.clone(),
                });
            }
        }
    }
    errors
}

fn find_cycle(config: &WorkflowConfig) -> Option<Vec<String>> {
    // dependency -> dependents
    let mut graph: HashMap<&str, Vec<&str>> = config
        .nodes
        .iter()
        .map(|node| (node.name.as_str(), Vec::new()))
        .collect();
    for node in &config.nodes {
        for dependency in &node.depends_on {
            if let Some(dependents) = graph.get_mut(dependency.as_str()) {
                dependents.push(node.name.as_str());
            }
        }
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    // Declaration order keeps the reported cycle deterministic
    for node in &config.nodes {
        if !visited.contains(node.name.as_str()) {
            if let Some(cycle) = dfs_cycle_detection(
                node.name.as_str(),
                &graph,
                &mut visited,
                &mut rec_stack,
                &mut path,
            ) {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    for &neighbor in graph.get(node).into_iter().flatten() {
        if !visited.contains(neighbor) {
            if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                return Some(cycle);
            }
        } else if rec_stack.contains(neighbor) {
            let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(neighbor.to_string());
            return Some(cycle);
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
