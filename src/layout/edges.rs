//! Edge-weight maps over tree nodes.
//!
//! Every level of the dendrogram carries an `EdgeWeights` map keyed by
//! ordered `(from, to)` pairs. The maps are ordered so that every pass over
//! them visits edges in the same sequence.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::tree::{TreeArena, TreeId};
use crate::graph::WeightedGraph;

pub type EdgeWeights = BTreeMap<(TreeId, TreeId), f64>;

/// One snapshot of the graph coarsened to a dendrogram level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub nodes: BTreeSet<TreeId>,
    pub edges: EdgeWeights,
}

impl Level {
    pub fn new(nodes: BTreeSet<TreeId>, edges: EdgeWeights) -> Self {
        Self { nodes, edges }
    }
}

/// Positive symmetric weights: `w(a,b) = w(b,a) = |orig(a,b)| + |orig(b,a)|`.
///
/// Nodes of `graph` missing from `arena` are skipped.
pub fn symmetrize(graph: &WeightedGraph, arena: &TreeArena) -> EdgeWeights {
    let mut symmetric = EdgeWeights::new();
    for (from, to, weight) in graph.edges() {
        let (Some(a), Some(b)) = (arena.leaf(from), arena.leaf(to)) else {
            continue;
        };
        *symmetric.entry((a, b)).or_insert(0.0) += weight.abs();
        if a != b {
            *symmetric.entry((b, a)).or_insert(0.0) += weight.abs();
        }
    }
    symmetric
}

/// Coarsen `edges` through `mapping`, summing edges that collapse together.
///
/// Nodes without an entry map to themselves. Edges whose endpoints map to the
/// same node disappear.
pub fn combine_edge_weights(edges: &EdgeWeights, mapping: &HashMap<TreeId, TreeId>) -> EdgeWeights {
    let mut combined = EdgeWeights::new();
    for (&(from, to), &weight) in edges {
        let mapped_from = mapping.get(&from).copied().unwrap_or(from);
        let mapped_to = mapping.get(&to).copied().unwrap_or(to);
        if mapped_from != mapped_to {
            *combined.entry((mapped_from, mapped_to)).or_insert(0.0) += weight;
        }
    }
    combined
}

/// Edges with both endpoints inside `nodes`.
pub fn restrict(edges: &EdgeWeights, nodes: &BTreeSet<TreeId>) -> EdgeWeights {
    edges
        .iter()
        .filter(|((from, to), _)| nodes.contains(from) && nodes.contains(to))
        .map(|(&edge, &weight)| (edge, weight))
        .collect()
}

/// Undirected neighbour sets for every node in `nodes`.
pub fn adjacency(nodes: &BTreeSet<TreeId>, edges: &EdgeWeights) -> BTreeMap<TreeId, BTreeSet<TreeId>> {
    let mut result: BTreeMap<TreeId, BTreeSet<TreeId>> =
        nodes.iter().map(|&node| (node, BTreeSet::new())).collect();
    for &(from, to) in edges.keys() {
        result.entry(from).or_default().insert(to);
        result.entry(to).or_default().insert(from);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> BTreeSet<TreeId> {
        raw.iter().copied().map(TreeId).collect()
    }

    #[test]
    fn test_symmetrize_sums_both_directions() {
        let g = WeightedGraph::from_edges([("a", "b", 2.0), ("b", "a", -3.0), ("b", "c", 1.5)]);
        let arena = TreeArena::with_leaves(&g.node_names());
        let sym = symmetrize(&g, &arena);

        let (a, b, c) = (TreeId(0), TreeId(1), TreeId(2));
        assert_eq!(sym[&(a, b)], 5.0);
        assert_eq!(sym[&(b, a)], 5.0);
        assert_eq!(sym[&(b, c)], 1.5);
        assert_eq!(sym[&(c, b)], 1.5);
        assert_eq!(sym.len(), 4);
    }

    #[test]
    fn test_combine_edge_weights_accumulates() {
        let mut edges = EdgeWeights::new();
        edges.insert((TreeId(0), TreeId(2)), 1.0);
        edges.insert((TreeId(1), TreeId(2)), 2.0);
        edges.insert((TreeId(0), TreeId(1)), 4.0);

        let pair = TreeId(3);
        let mapping: HashMap<TreeId, TreeId> = [(TreeId(0), pair), (TreeId(1), pair)].into();
        let combined = combine_edge_weights(&edges, &mapping);

        // the internal 0-1 edge vanishes, the two edges into 2 merge
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[&(pair, TreeId(2))], 3.0);
    }

    #[test]
    fn test_restrict_and_adjacency() {
        let mut edges = EdgeWeights::new();
        edges.insert((TreeId(0), TreeId(1)), 1.0);
        edges.insert((TreeId(1), TreeId(2)), 1.0);

        let sub = restrict(&edges, &ids(&[0, 1]));
        assert_eq!(sub.len(), 1);

        let adj = adjacency(&ids(&[0, 1, 2, 3]), &edges);
        assert_eq!(adj[&TreeId(1)], ids(&[0, 2]));
        assert!(adj[&TreeId(3)].is_empty());
    }
}
