//! Graph data structures and whole-graph utilities.
//!
//! This module provides the weighted regulatory network that every layout
//! consumes, built on petgraph's StableGraph, plus simplifications that derive
//! smaller graphs from it (trimmed, primary-influence, skeleton).

pub mod transform;
mod weighted;

pub use transform::{primary_influence, skeleton, trim_leaves};
pub use weighted::WeightedGraph;
