//! Spoke layout: nodes grouped into wheels around their strongest factor.
//!
//! # Algorithm Overview
//!
//! Each combine step puts every node into the wheel of the node that
//! influences it most. A wheel with at least two members is laid out on its
//! own (recursively, with the same combine step on the wheel's internal
//! edges) and collapses into a single node; a wheel that swallows the whole
//! level is split evenly instead. Nodes left outside every wheel are
//! gathered into one evenly split subtree. Once the tree is complete its
//! levels are rebuilt top-down so that positions follow the final shape.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::builder::{get_subtree, Combine};
use super::edges::{combine_edge_weights, restrict, symmetrize, Level};
use super::geneology::compute_geneology;
use super::strength::StrengthStats;
use super::tree::{TreeArena, TreeId};
use super::{leaf_arena, place, Layout, LayoutConfig};
use crate::error::{LayoutError, Result};
use crate::graph::WeightedGraph;

/// Combine step that collapses whole wheels at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpokeCombine;

impl SpokeCombine {
    /// Group the level's nodes by strongest factor.
    ///
    /// Nodes are visited in id order. An unassigned node joins its factor's
    /// wheel, and the factor is marked assigned so it stays in its own wheel.
    fn wheels(level: &Level, stats: &StrengthStats) -> BTreeMap<TreeId, BTreeSet<TreeId>> {
        let mut wheels: BTreeMap<TreeId, BTreeSet<TreeId>> = stats
            .strongest_count
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&center, _)| (center, BTreeSet::from([center])))
            .collect();
        let mut assigned: BTreeSet<TreeId> = BTreeSet::new();

        for &node in &level.nodes {
            if assigned.contains(&node) {
                continue;
            }
            let Some(&center) = stats.strongest_factor.get(&node) else {
                continue;
            };
            wheels.entry(center).or_default().insert(node);
            assigned.insert(node);
            assigned.insert(center);
            if node != center {
                if let Some(own) = wheels.get_mut(&node) {
                    own.remove(&node);
                }
            }
        }
        wheels
    }
}

impl Combine for SpokeCombine {
    fn combine(&self, arena: &mut TreeArena, level: &Level) -> Result<Level> {
        let stats = StrengthStats::compute(&level.nodes, &level.edges);
        let total = level.nodes.len();
        let mut combined = BTreeSet::new();
        let mut mapping: HashMap<TreeId, TreeId> = HashMap::with_capacity(total);

        for wheel in Self::wheels(level, &stats).into_values() {
            if wheel.len() < 2 {
                continue;
            }
            let wheel_root = if wheel.len() >= total {
                let members: Vec<TreeId> = wheel.iter().copied().collect();
                arena.balanced(&members).ok_or(LayoutError::EmptyNodeSet)?
            } else {
                let edges = restrict(&level.edges, &wheel);
                get_subtree(arena, wheel.clone(), edges, self)?.root
            };
            for node in wheel {
                mapping.insert(node, wheel_root);
            }
            combined.insert(wheel_root);
        }

        let rest: Vec<TreeId> = level
            .nodes
            .iter()
            .filter(|node| !mapping.contains_key(node))
            .copied()
            .collect();
        if let Some(rest_root) = arena.balanced(&rest) {
            for node in rest {
                mapping.insert(node, rest_root);
            }
            combined.insert(rest_root);
        }

        let edges = combine_edge_weights(&level.edges, &mapping);
        Ok(Level::new(combined, edges))
    }
}

/// Lay out `graph` with wheel-based grouping.
pub fn spoke_layout(graph: &WeightedGraph, config: &LayoutConfig) -> Result<Layout> {
    config.validate()?;
    if graph.node_count() == 0 {
        return Ok(Layout::default());
    }

    let mut arena = leaf_arena(graph);
    let edges = symmetrize(graph, &arena);
    let nodes: BTreeSet<TreeId> = arena.leaf_ids().collect();
    let root = get_subtree(&mut arena, nodes, edges.clone(), &SpokeCombine)?.root;
    let levels = compute_geneology(&mut arena, root, &edges);

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        levels = levels.len(),
        "spoke layout"
    );
    place(&arena, root, &levels, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::edges::EdgeWeights;
    use crate::layout::Point;

    fn star_graph() -> WeightedGraph {
        // hub regulates five targets, plus a separate pair
        let mut graph = WeightedGraph::new();
        for target in ["t1", "t2", "t3", "t4", "t5"] {
            graph.add_edge("hub", target, 2.0);
        }
        graph.add_edge("p", "q", 1.0);
        graph
    }

    #[test]
    fn test_wheel_collects_spokes() {
        let names: Vec<String> = (0..4).map(|i| format!("n{i}")).collect();
        let mut arena = TreeArena::with_leaves(&names);
        let mut edges = EdgeWeights::new();
        for spoke in 1..4 {
            edges.insert((TreeId(0), TreeId(spoke)), 3.0);
            edges.insert((TreeId(spoke), TreeId(0)), 1.0);
        }
        let nodes: BTreeSet<TreeId> = arena.leaf_ids().collect();
        let level = Level::new(nodes, edges);

        // n0 joins the wheel of n1 (its strongest factor); n2 and n3 stay
        // in n0's wheel without n0 itself.
        let next = SpokeCombine.combine(&mut arena, &level).unwrap();
        assert_eq!(next.nodes.len(), 2);
        let mut groups: Vec<Vec<String>> = next
            .nodes
            .iter()
            .map(|&n| arena.members(n).into_iter().collect())
            .collect();
        groups.sort();
        assert_eq!(groups, vec![vec!["n0", "n1"], vec!["n2", "n3"]]);
    }

    #[test]
    fn test_no_edges_single_balanced_subtree() {
        let mut arena = TreeArena::with_leaves(&["a", "b", "c"]);
        let nodes: BTreeSet<TreeId> = arena.leaf_ids().collect();
        let next = SpokeCombine.combine(&mut arena, &Level::new(nodes, EdgeWeights::new())).unwrap();
        assert_eq!(next.nodes.len(), 1);
    }

    #[test]
    fn test_spoke_layout_places_every_node() {
        let graph = star_graph();
        let layout = spoke_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.len(), graph.node_count());
        for p in layout.positions.values() {
            assert!((0.0..=1000.0).contains(&p.x) && (0.0..=1000.0).contains(&p.y));
        }

        let hub_wheel: BTreeSet<String> = ["hub", "t1", "t2", "t3", "t4", "t5"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(layout.groups.contains_key(&hub_wheel));
    }

    #[test]
    fn test_spoke_layout_deterministic() {
        let graph = star_graph();
        let config = LayoutConfig::default();
        assert_eq!(spoke_layout(&graph, &config).unwrap(), spoke_layout(&graph, &config).unwrap());
    }

    #[test]
    fn test_spoke_layout_single_node() {
        let mut graph = WeightedGraph::new();
        graph.add_node("only");
        let layout = spoke_layout(&graph, &LayoutConfig::default()).unwrap();
        assert_eq!(layout.positions["only"], Point { x: 500.0, y: 500.0 });
        assert!(layout.groups.is_empty());
    }
}
