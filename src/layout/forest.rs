//! Default layout: pairwise strongest-influence dendrogram.

use std::collections::BTreeSet;

use super::builder::{get_subtree, PairCombine};
use super::edges::symmetrize;
use super::{leaf_arena, place, Layout, LayoutConfig};
use crate::error::Result;
use crate::graph::WeightedGraph;

/// Lay out `graph` by repeatedly pairing nodes with their strongest partners.
pub fn forest_layout(graph: &WeightedGraph, config: &LayoutConfig) -> Result<Layout> {
    config.validate()?;
    if graph.node_count() == 0 {
        return Ok(Layout::default());
    }

    let mut arena = leaf_arena(graph);
    let edges = symmetrize(graph, &arena);
    let nodes: BTreeSet<_> = arena.leaf_ids().collect();
    let subtree = get_subtree(&mut arena, nodes, edges, &PairCombine)?;

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        levels = subtree.levels.len(),
        "forest layout"
    );
    place(&arena, subtree.root, &subtree.levels, config)
}
