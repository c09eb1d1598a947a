// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The workflow graph: nodes, dependency edges, ordering and pruning.
//!
//! A [`Graph`] owns every [`Node`]. Edges are stored as [`NodeId`] handles
//! (declaration indices), so a node never owns its dependencies. Nodes can
//! only depend on nodes that already exist, and late edges added through
//! [`Graph::add_dependency`] are checked for cycles, so a graph is acyclic
//! at all times.

mod context;
mod node;
mod prune;

pub use context::Graph;
pub(crate) use node::check_name;
pub use node::{Node, NodeId};
pub use prune::ExecutionPlan;
