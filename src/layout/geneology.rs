//! Level reconstruction from a finished tree.
//!
//! Layouts that build their tree in one shot (nested subtrees, bisection,
//! linkage) have no per-level history. This rebuilds one: walking down from
//! the root, each level replaces every internal node by its two children and
//! keeps leaves as they are, until only leaves remain. Edge weights are then
//! coarsened back up from the leaf level.

use std::collections::{BTreeSet, HashMap};

use super::edges::{combine_edge_weights, EdgeWeights, Level};
use super::tree::{TreeArena, TreeId};

/// Reset parents to the tree under `root` and return its levels, leaves first.
pub fn compute_geneology(arena: &mut TreeArena, root: TreeId, leaf_edges: &EdgeWeights) -> Vec<Level> {
    arena.reparent_from(root);

    let mut node_sets: Vec<BTreeSet<TreeId>> = Vec::new();
    let mut current: BTreeSet<TreeId> = BTreeSet::from([root]);
    loop {
        let next: BTreeSet<TreeId> = current
            .iter()
            .flat_map(|&node| match arena.children(node) {
                Some((left, right)) => vec![left, right],
                None => vec![node],
            })
            .collect();
        let done = next == current;
        node_sets.push(current);
        if done {
            break;
        }
        current = next;
    }

    // node_sets runs root first and ends with the leaf set.
    let mut finer = match node_sets.pop() {
        Some(leaves) => Level::new(leaves, leaf_edges.clone()),
        None => return Vec::new(),
    };
    let mut levels = Vec::with_capacity(node_sets.len() + 1);
    while let Some(coarser_nodes) = node_sets.pop() {
        let mut mapping: HashMap<TreeId, TreeId> = HashMap::new();
        for &node in &coarser_nodes {
            if finer.nodes.contains(&node) {
                continue;
            }
            if let Some((left, right)) = arena.children(node) {
                mapping.insert(left, node);
                mapping.insert(right, node);
            }
        }
        let edges = combine_edge_weights(&finer.edges, &mapping);
        let coarser = Level::new(coarser_nodes, edges);
        levels.push(std::mem::replace(&mut finer, coarser));
    }
    levels.push(finer);
    levels
}
