//! Simple-tree layout: bisection over influence paths.
//!
//! # Algorithm Overview
//!
//! 1. For each node compute its influence path: its strongest factor, that
//!    factor's strongest factor on the graph collapsed onto factors, and so
//!    on, up to a bounded depth.
//! 2. Sort nodes by `(path, name)` so nodes with a common chain of
//!    influencers sit next to each other.
//! 3. Split the sorted list recursively. Each split goes where consecutive
//!    paths diverge earliest-but-deepest, searching outward from the middle.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::edges::{combine_edge_weights, symmetrize, EdgeWeights};
use super::geneology::compute_geneology;
use super::strength::StrengthStats;
use super::tree::{TreeArena, TreeId};
use super::{leaf_arena, place, Layout, LayoutConfig, SimpleTreeConfig};
use crate::error::{LayoutError, Result};
use crate::graph::WeightedGraph;

pub type InfluencePath = Vec<TreeId>;

/// Influence path of every node in `nodes`, at most `level_limit` long.
///
/// A node without a strongest factor (no incoming weight) has an empty path.
pub fn influence_paths(
    nodes: &BTreeSet<TreeId>,
    edges: &EdgeWeights,
    level_limit: usize,
) -> BTreeMap<TreeId, InfluencePath> {
    influence_paths_from(nodes, edges, 0, level_limit)
}

fn influence_paths_from(
    nodes: &BTreeSet<TreeId>,
    edges: &EdgeWeights,
    level: usize,
    level_limit: usize,
) -> BTreeMap<TreeId, InfluencePath> {
    if edges.is_empty() || level >= level_limit {
        return nodes.iter().map(|&n| (n, Vec::new())).collect();
    }

    let stats = StrengthStats::compute(nodes, edges);
    let mut factor = stats.strongest_factor;
    // Every factor becomes its own factor, so chains collapse to length one.
    let sources: Vec<TreeId> = factor.keys().copied().collect();
    for node in sources {
        if let Some(&f) = factor.get(&node) {
            factor.insert(f, f);
        }
    }

    let influencers: BTreeSet<TreeId> = factor.values().copied().collect();
    let mapping: HashMap<TreeId, TreeId> = factor.iter().map(|(&n, &f)| (n, f)).collect();
    let collapsed = combine_edge_weights(edges, &mapping);
    let tails = influence_paths_from(&influencers, &collapsed, level + 1, level_limit);

    nodes
        .iter()
        .map(|&node| {
            let path = match factor.get(&node) {
                Some(&f) => {
                    let mut path = Vec::with_capacity(level_limit - level);
                    path.push(f);
                    if let Some(tail) = tails.get(&f) {
                        path.extend_from_slice(tail);
                    }
                    path
                }
                None => Vec::new(),
            };
            (node, path)
        })
        .collect()
}

/// One-based index of the first differing entry, or 0 for equal paths.
///
/// When one path is a prefix of the other the result is one past the
/// shorter length.
pub fn difference_depth(a: &[TreeId], b: &[TreeId]) -> usize {
    if a == b {
        return 0;
    }
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.len().min(b.len()))
        + 1
}

/// Recursively bisect `order` into a binary tree.
///
/// Candidate split points are scanned outward from the middle, within `n/4`
/// when `heuristic` is set and over the whole range otherwise. The deepest
/// path difference wins; the first one found wins ties. With no difference
/// the list is split in the middle.
pub fn split_subtree(
    arena: &mut TreeArena,
    order: &[(InfluencePath, TreeId)],
    heuristic: bool,
) -> Result<TreeId> {
    let count = order.len();
    match order {
        [] => return Err(LayoutError::EmptyNodeSet),
        [(_, node)] => return Ok(*node),
        _ => {}
    }

    let middle = count / 2;
    let offset_limit = if heuristic { count / 4 } else { count / 2 + 1 };
    let mut split_index = None;
    let mut deepest = 0;
    for offset in 0..offset_limit {
        for index in [middle + offset, middle.saturating_sub(offset)] {
            if index < 1 || index > count - 1 {
                continue;
            }
            let depth = difference_depth(&order[index].0, &order[index - 1].0);
            if depth > deepest {
                split_index = Some(index);
                deepest = depth;
            }
        }
    }

    let (left, right) = order.split_at(split_index.unwrap_or(middle));
    let left = split_subtree(arena, left, heuristic)?;
    let right = split_subtree(arena, right, heuristic)?;
    Ok(arena.join(left, right))
}

/// Lay out `graph` by bisecting nodes sorted by influence path.
pub fn tree_layout(graph: &WeightedGraph, config: &LayoutConfig, tree: &SimpleTreeConfig) -> Result<Layout> {
    config.validate()?;
    if graph.node_count() == 0 {
        return Ok(Layout::default());
    }

    let mut arena = leaf_arena(graph);
    let edges = symmetrize(graph, &arena);
    let nodes: BTreeSet<TreeId> = arena.leaf_ids().collect();
    let paths = influence_paths(&nodes, &edges, tree.level_limit);

    let mut order: Vec<(InfluencePath, TreeId)> = paths.into_iter().map(|(n, p)| (p, n)).collect();
    order.sort_unstable();
    let root = split_subtree(&mut arena, &order, tree.heuristic)?;
    let levels = compute_geneology(&mut arena, root, &edges);

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        levels = levels.len(),
        heuristic = tree.heuristic,
        "tree layout"
    );
    place(&arena, root, &levels, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<TreeId> {
        raw.iter().copied().map(TreeId).collect()
    }

    #[test]
    fn test_difference_depth() {
        assert_eq!(difference_depth(&ids(&[1, 2]), &ids(&[1, 2])), 0);
        assert_eq!(difference_depth(&ids(&[1, 2]), &ids(&[3, 2])), 1);
        assert_eq!(difference_depth(&ids(&[1, 2, 3]), &ids(&[1, 2, 4])), 3);
        assert_eq!(difference_depth(&ids(&[1]), &ids(&[1, 5])), 2);
        assert_eq!(difference_depth(&[], &ids(&[4])), 1);
    }

    #[test]
    fn test_influence_paths_follow_factors() {
        // Two hubs: 0 drives 1 and 2; 3 drives 4. Hubs are linked weakly.
        let nodes: BTreeSet<TreeId> = (0..5).map(TreeId).collect();
        let mut edges = EdgeWeights::new();
        for (a, b, w) in [(0, 1, 5.0), (0, 2, 5.0), (3, 4, 5.0), (0, 3, 1.0)] {
            edges.insert((TreeId(a), TreeId(b)), w);
            edges.insert((TreeId(b), TreeId(a)), w);
        }

        let paths = influence_paths(&nodes, &edges, 5);
        assert_eq!(paths.len(), 5);
        // 0 and 2 both collapse onto 0; 3 and 4 both collapse onto 4
        assert_eq!(paths[&TreeId(2)][0], TreeId(0));
        assert_eq!(paths[&TreeId(0)], paths[&TreeId(2)]);
        assert_eq!(paths[&TreeId(3)][0], TreeId(4));
        assert_eq!(paths[&TreeId(3)], paths[&TreeId(4)]);
        assert_ne!(paths[&TreeId(2)], paths[&TreeId(4)]);
        assert!(paths.values().all(|p| !p.is_empty() && p.len() <= 5));
    }

    #[test]
    fn test_influence_paths_respect_limit() {
        let nodes: BTreeSet<TreeId> = (0..3).map(TreeId).collect();
        let mut edges = EdgeWeights::new();
        edges.insert((TreeId(0), TreeId(1)), 1.0);
        edges.insert((TreeId(1), TreeId(0)), 1.0);
        let paths = influence_paths(&nodes, &edges, 0);
        assert!(paths.values().all(Vec::is_empty));
        let paths = influence_paths(&nodes, &edges, 1);
        assert_eq!(paths[&TreeId(0)].len(), 1);
        assert!(paths[&TreeId(2)].is_empty());
    }

    #[test]
    fn test_split_prefers_divergence() {
        let names: Vec<String> = (0..6).map(|i| format!("n{i}")).collect();
        let mut arena = TreeArena::with_leaves(&names);
        // three nodes under influencer 10, three under 11
        let order: Vec<(InfluencePath, TreeId)> = (0..6)
            .map(|i| (ids(&[if i < 3 { 10 } else { 11 }]), TreeId(i)))
            .collect();

        let root = split_subtree(&mut arena, &order, false).unwrap();
        let (left, right) = arena.children(root).unwrap();
        assert_eq!(arena.size(left), 3);
        assert_eq!(arena.size(right), 3);
    }

    #[test]
    fn test_heuristic_limits_search_window() {
        let names: Vec<String> = (0..8).map(|i| format!("n{i}")).collect();
        let mut arena = TreeArena::with_leaves(&names);
        // single divergence between positions 0 and 1, far from the middle
        let order: Vec<(InfluencePath, TreeId)> = (0..8)
            .map(|i| (ids(&[if i == 0 { 1 } else { 2 }]), TreeId(i)))
            .collect();

        let balanced = split_subtree(&mut arena, &order, true).unwrap();
        let (left, _) = arena.children(balanced).unwrap();
        assert_eq!(arena.size(left), 4);

        // leaves of the first arena already have parents
        let mut arena = TreeArena::with_leaves(&names);
        let scanned = split_subtree(&mut arena, &order, false).unwrap();
        let (left, right) = arena.children(scanned).unwrap();
        assert_eq!(arena.size(left), 1);
        assert_eq!(arena.size(right), 7);
    }

    #[test]
    fn test_tree_layout_positions_all() {
        let graph = WeightedGraph::from_edges([
            ("tf1", "g1", 3.0),
            ("tf1", "g2", 2.0),
            ("tf2", "g3", -4.0),
            ("tf2", "g4", 1.0),
            ("tf1", "tf2", 0.5),
        ]);
        let layout = tree_layout(&graph, &LayoutConfig::default(), &SimpleTreeConfig::default()).unwrap();
        assert_eq!(layout.len(), 6);
        for p in layout.positions.values() {
            assert!((0.0..=1000.0).contains(&p.x) && (0.0..=1000.0).contains(&p.y));
        }
    }

    #[test]
    fn test_tree_layout_empty_and_edgeless() {
        let empty = tree_layout(&WeightedGraph::new(), &LayoutConfig::default(), &SimpleTreeConfig::default());
        assert!(empty.unwrap().is_empty());

        let mut graph = WeightedGraph::new();
        for name in ["a", "b", "c"] {
            graph.add_node(name);
        }
        let layout = tree_layout(&graph, &LayoutConfig::default(), &SimpleTreeConfig::default()).unwrap();
        assert_eq!(layout.len(), 3);
    }
}
