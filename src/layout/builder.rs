//! Bottom-up dendrogram construction.
//!
//! The Tree Builder repeatedly coarsens a level with a [`Combine`] strategy
//! until one node is left, keeping every intermediate level for the
//! top-down position pass.
//!
//! # Default combine ("pair by strongest mutual influence")
//!
//! 1. Run the strength analysis; nodes that took part in no strongest-factor
//!    update are isolated.
//! 2. Visit the remaining nodes from highest fan-in down. For each such
//!    central node, collect its still-free spokes sorted by their own fan-in,
//!    slot the central node into the middle, append any isolated nodes not yet
//!    used, and pair the list up from the weak end. An odd node out is carried
//!    to the next level unpaired.
//! 3. Pair whatever is still free by ascending subtree size.
//! 4. Sum the level's edges through the node -> parent mapping.

use std::collections::{BTreeSet, HashMap};

use super::edges::{combine_edge_weights, EdgeWeights, Level};
use super::strength::StrengthStats;
use super::tree::{TreeArena, TreeId};
use crate::error::{LayoutError, Result};

/// Strategy that coarsens one level of the dendrogram.
///
/// Implementations must return strictly fewer nodes than they receive
/// whenever they receive more than one.
pub trait Combine {
    fn combine(&self, arena: &mut TreeArena, level: &Level) -> Result<Level>;
}

/// A built subtree and the levels it was built through, leaf level first.
#[derive(Debug, Clone)]
pub struct Subtree {
    pub root: TreeId,
    pub levels: Vec<Level>,
}

/// Combine `nodes` level by level until a single root remains.
pub fn get_subtree<C: Combine + ?Sized>(
    arena: &mut TreeArena,
    nodes: BTreeSet<TreeId>,
    edges: EdgeWeights,
    combine: &C,
) -> Result<Subtree> {
    if nodes.is_empty() {
        return Err(LayoutError::EmptyNodeSet);
    }

    let mut levels = vec![Level::new(nodes, edges)];
    loop {
        let Some(current) = levels.last() else {
            return Err(LayoutError::EmptyNodeSet);
        };
        let remaining = current.nodes.len();
        if remaining == 1 {
            break;
        }

        let next = combine.combine(arena, current)?;
        tracing::trace!(
            level = levels.len(),
            nodes = remaining,
            combined = next.nodes.len(),
            edges = next.edges.len(),
            "combined level"
        );
        if next.nodes.is_empty() || next.nodes.len() >= remaining {
            return Err(LayoutError::NoProgress {
                level: levels.len(),
                nodes: remaining,
            });
        }
        levels.push(next);
    }

    let root = levels
        .last()
        .and_then(|level| level.nodes.first().copied())
        .ok_or(LayoutError::EmptyNodeSet)?;
    Ok(Subtree { root, levels })
}

/// The default pairwise combine step.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairCombine;

/// Bookkeeping for one pairwise combine pass.
struct Pairing {
    not_combined: BTreeSet<TreeId>,
    combined: BTreeSet<TreeId>,
    mapping: HashMap<TreeId, TreeId>,
}

impl Pairing {
    fn new(nodes: &BTreeSet<TreeId>) -> Self {
        Self {
            not_combined: nodes.clone(),
            combined: BTreeSet::new(),
            mapping: HashMap::with_capacity(nodes.len()),
        }
    }

    /// Pair consecutive entries of `order`; a trailing odd entry is carried over.
    fn pair_up(&mut self, arena: &mut TreeArena, order: &[TreeId]) {
        let mut chunks = order.chunks_exact(2);
        for pair in chunks.by_ref() {
            let (first, second) = (pair[0], pair[1]);
            let parent = arena.join(first, second);
            self.combined.insert(parent);
            for node in [first, second] {
                self.not_combined.remove(&node);
                self.mapping.insert(node, parent);
            }
        }
        if let [remaining] = chunks.remainder() {
            self.not_combined.remove(remaining);
            self.mapping.insert(*remaining, *remaining);
            self.combined.insert(*remaining);
        }
    }
}

impl Combine for PairCombine {
    fn combine(&self, arena: &mut TreeArena, level: &Level) -> Result<Level> {
        let stats = StrengthStats::compute(&level.nodes, &level.edges);
        let mut pairing = Pairing::new(&level.nodes);
        let mut isolated: Vec<TreeId> = stats.isolated.iter().copied().collect();

        let mut by_strength: Vec<(usize, TreeId)> = level
            .nodes
            .iter()
            .filter(|n| !stats.isolated.contains(n))
            .map(|&n| (stats.count(n), n))
            .collect();
        by_strength.sort_unstable();

        while let Some((count, central)) = by_strength.pop() {
            if count < 1 {
                break;
            }
            let mut spokes: Vec<(usize, TreeId)> = stats
                .spokes(central)
                .filter(|n| pairing.not_combined.contains(n))
                .map(|n| (stats.count(n), n))
                .collect();
            spokes.sort_unstable();

            let mut order: Vec<TreeId> = spokes.into_iter().map(|(_, n)| n).collect();
            if pairing.not_combined.contains(&central) {
                order.insert(order.len() / 2, central);
            }
            order.append(&mut isolated);

            if order.len() > 1 {
                pairing.pair_up(arena, &order);
            }
        }

        let mut leftovers: Vec<(usize, TreeId)> = pairing
            .not_combined
            .iter()
            .map(|&n| (arena.size(n), n))
            .collect();
        leftovers.sort_unstable();
        let leftovers: Vec<TreeId> = leftovers.into_iter().map(|(_, n)| n).collect();
        pairing.pair_up(arena, &leftovers);

        let edges = combine_edge_weights(&level.edges, &pairing.mapping);
        Ok(Level::new(pairing.combined, edges))
    }
}
