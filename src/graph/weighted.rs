//! WeightedGraph - directed regulatory network with signed edge weights.
//!
//! Topology lives in petgraph's StableGraph so that removals (used by the
//! graph utilities) keep the remaining indices valid. Nodes are addressed by
//! name; node weights are derived from incident edges rather than stored.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};
use std::collections::HashMap;

/// A directed graph with `f64` edge weights and string node names.
///
/// Self-loops are ignored. Adding an edge that already exists replaces its
/// weight. The layout engine only reads this structure.
#[derive(Debug, Clone, Default)]
pub struct WeightedGraph {
    /// Node payload is the node name, edge payload the signed weight.
    graph: StableGraph<String, f64, Directed>,

    /// Map from node name to petgraph NodeIndex
    name_to_index: HashMap<String, NodeIndex>,
}

impl WeightedGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            name_to_index: HashMap::with_capacity(node_capacity),
        }
    }

    /// Build a graph from `(from, to, weight)` triples.
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: AsRef<str>,
    {
        let mut graph = Self::new();
        for (from, to, weight) in edges {
            graph.add_edge(from.as_ref(), to.as_ref(), weight);
        }
        graph
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Register a node, returning its index. Existing nodes are left alone.
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.name_to_index.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.name_to_index.insert(name.to_string(), index);
        index
    }

    /// Remove a node and all of its incident edges.
    ///
    /// Returns true if the node existed.
    pub fn remove_node(&mut self, name: &str) -> bool {
        match self.name_to_index.remove(name) {
            Some(index) => {
                self.graph.remove_node(index);
                true
            }
            None => false,
        }
    }

    /// Check whether a node is present.
    pub fn contains_node(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node names in ascending order.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.name_to_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Derived node weight: sum of `|w|` over incident edges, both directions.
    ///
    /// Returns None for unknown nodes.
    pub fn node_weight(&self, name: &str) -> Option<f64> {
        let &index = self.name_to_index.get(name)?;
        let total: f64 = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.weight().abs())
            .sum();
        Some(total)
    }

    /// All node weights keyed by name.
    pub fn node_weights(&self) -> HashMap<String, f64> {
        self.name_to_index
            .keys()
            .map(|name| (name.clone(), self.node_weight(name).unwrap_or(0.0)))
            .collect()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add (or overwrite) the directed edge `from -> to`.
    ///
    /// Self-loops are silently ignored and return false.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) -> bool {
        if from == to {
            return false;
        }
        let source = self.add_node(from);
        let target = self.add_node(to);
        match self.graph.find_edge(source, target) {
            Some(edge) => {
                if let Some(w) = self.graph.edge_weight_mut(edge) {
                    *w = weight;
                }
            }
            None => {
                self.graph.add_edge(source, target, weight);
            }
        }
        true
    }

    /// Weight of the directed edge `from -> to`, if present.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<f64> {
        let &source = self.name_to_index.get(from)?;
        let &target = self.name_to_index.get(to)?;
        let edge = self.graph.find_edge(source, target)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Remove the directed edge `from -> to`.
    ///
    /// Returns true if the edge existed and was removed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&source), Some(&target)) =
            (self.name_to_index.get(from), self.name_to_index.get(to))
        else {
            return false;
        };
        match self.graph.find_edge(source, target) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Iterate over `(from, to, weight)` triples in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].as_str(),
                self.graph[e.target()].as_str(),
                *e.weight(),
            )
        })
    }

    /// Edges touching `name` in either direction, as `(from, to, weight)`.
    pub fn incident_edges(&self, name: &str) -> Vec<(&str, &str, f64)> {
        let Some(&index) = self.name_to_index.get(name) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| {
                (
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    *e.weight(),
                )
            })
            .collect()
    }

    /// Names of nodes with at least one outgoing edge.
    pub fn sources(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&index| {
                self.graph
                    .edges_directed(index, Direction::Outgoing)
                    .next()
                    .is_some()
            })
            .map(|index| self.graph[index].as_str())
            .collect()
    }

    /// Neighbour names of a node, ignoring direction.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        self.name_to_index
            .get(name)
            .map(|&index| {
                self.graph
                    .neighbors_undirected(index)
                    .map(|n| self.graph[n].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.name_to_index.clear();
    }
}
