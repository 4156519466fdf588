//! Top-down position assignment.
//!
//! The root takes the whole square. Walking the levels from the root down,
//! every positioned internal node whose two children sit in the next finer
//! level is split in two, and the children are placed on whichever side
//! keeps them closer (weighted L1) to their already placed neighbours.
//! Placed nodes are never moved again, so each split is a local, greedy
//! choice of orientation.
//!
//! Nodes that the level walk cannot reach (internal nodes created in one step
//! with no finer level of their own) are split afterwards in default
//! orientation, so every leaf always ends up with a position.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::edges::{adjacency, EdgeWeights, Level};
use super::rect::{split_position, Rect};
use super::rng::XorShift64Star;
use super::tree::{TreeArena, TreeId};
use super::{Layout, LayoutConfig};
use crate::error::Result;

/// Ratio bounds applied when jitter perturbs a split.
const JITTER_RATIO_MIN: f64 = 0.05;
const JITTER_RATIO_MAX: f64 = 0.95;

pub type Positions = HashMap<TreeId, Rect>;

/// Adjacency and weights of the level a split is placing children into.
struct ChildLevel<'a> {
    adjacency: BTreeMap<TreeId, BTreeSet<TreeId>>,
    edges: &'a EdgeWeights,
}

/// Assigns a rectangle to every tree node reachable from the root.
pub struct PositionAssigner<'a> {
    arena: &'a TreeArena,
    side_length: f64,
    margin: f64,
    jitter_factor: f64,
    rng: Option<XorShift64Star>,
}

impl<'a> PositionAssigner<'a> {
    pub fn new(arena: &'a TreeArena, config: &LayoutConfig) -> Self {
        Self {
            arena,
            side_length: config.side_length,
            margin: config.margin,
            jitter_factor: config.jitter_factor,
            rng: config.jitter.then(|| XorShift64Star::new(config.seed)),
        }
    }

    /// Place `root` on the full square and refine down through `levels`
    /// (given leaf level first).
    pub fn assign(&mut self, root: TreeId, levels: &[Level]) -> Result<Positions> {
        let mut positions = Positions::with_capacity(self.arena.len());
        positions.insert(root, Rect::square(self.side_length));

        let root_to_leaf: Vec<&Level> = levels.iter().rev().collect();
        for pair in root_to_leaf.windows(2) {
            let (level, child_level) = (pair[0], pair[1]);
            let child = ChildLevel {
                adjacency: adjacency(&child_level.nodes, &child_level.edges),
                edges: &child_level.edges,
            };
            for &node in &level.nodes {
                let Some(&rect) = positions.get(&node) else {
                    continue;
                };
                let Some((first, second)) = self.arena.children(node) else {
                    continue;
                };
                if positions.contains_key(&first) || positions.contains_key(&second) {
                    continue;
                }
                if !child_level.nodes.contains(&first) || !child_level.nodes.contains(&second) {
                    // created in one step without a finer level; left to the fallback pass
                    continue;
                }
                self.split_children(rect, first, second, Some(&child), &mut positions)?;
            }
        }

        let placed_late = self.fill_unplaced(root, &mut positions)?;
        if placed_late > 0 {
            tracing::warn!(
                nodes = placed_late,
                "placed tree nodes outside the level walk in default orientation"
            );
        }
        Ok(positions)
    }

    /// Split every positioned node whose children are still unplaced.
    fn fill_unplaced(&mut self, root: TreeId, positions: &mut Positions) -> Result<usize> {
        let mut placed = 0;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let Some((first, second)) = self.arena.children(node) else {
                continue;
            };
            if !positions.contains_key(&first) && !positions.contains_key(&second) {
                if let Some(&rect) = positions.get(&node) {
                    self.split_children(rect, first, second, None, positions)?;
                    placed += 2;
                }
            }
            stack.push(second);
            stack.push(first);
        }
        Ok(placed)
    }

    /// Choose the cheaper orientation of the split of `rect` between
    /// `first` and `second`. Ties keep `first` on the high side.
    fn split_children(
        &mut self,
        rect: Rect,
        first: TreeId,
        second: TreeId,
        child: Option<&ChildLevel<'_>>,
        positions: &mut Positions,
    ) -> Result<()> {
        let ratio = self.split_ratio(first, second);
        let (first_high, second_low) = split_position(rect, ratio, self.margin)?;
        let (second_high, first_low) = split_position(rect, 1.0 - ratio, self.margin)?;

        let (first_rect, second_rect) = match child {
            Some(child) => {
                let straight = self.penalty(first, &first_high, child, positions)
                    + self.penalty(second, &second_low, child, positions);
                let swapped = self.penalty(first, &first_low, child, positions)
                    + self.penalty(second, &second_high, child, positions);
                if swapped < straight {
                    (first_low, second_high)
                } else {
                    (first_high, second_low)
                }
            }
            None => (first_high, second_low),
        };
        positions.insert(first, first_rect);
        positions.insert(second, second_rect);
        Ok(())
    }

    /// Share of the split given to `first`, by leaf count, optionally jittered.
    fn split_ratio(&mut self, first: TreeId, second: TreeId) -> f64 {
        let first_size = self.arena.size(first) as f64;
        let total = first_size + self.arena.size(second) as f64;
        let ratio = first_size / total;
        match self.rng.as_mut() {
            Some(rng) => {
                let jittered = ratio + rng.next_f64_centered() * self.jitter_factor;
                jittered.clamp(ratio.min(JITTER_RATIO_MIN), ratio.max(JITTER_RATIO_MAX))
            }
            None => ratio,
        }
    }

    /// Weighted L1 distance from `candidate` to `node`'s neighbours as placed so far.
    fn penalty(&self, node: TreeId, candidate: &Rect, child: &ChildLevel<'_>, positions: &Positions) -> f64 {
        let Some(neighbors) = child.adjacency.get(&node) else {
            return 0.0;
        };
        neighbors
            .iter()
            .filter_map(|&neighbor| {
                let weight = child
                    .edges
                    .get(&(node, neighbor))
                    .or_else(|| child.edges.get(&(neighbor, node)))?;
                let placed = self.current_position(neighbor, positions)?;
                Some(weight * candidate.manhattan(&placed))
            })
            .sum()
    }

    /// The node's own rectangle, or that of its nearest placed ancestor.
    fn current_position(&self, node: TreeId, positions: &Positions) -> Option<Rect> {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(&rect) = positions.get(&id) {
                return Some(rect);
            }
            current = self.arena.parent(id);
        }
        None
    }

    /// Convert tree positions into the caller-facing layout.
    ///
    /// Leaves become points at their rectangle's centre (jittered inside the
    /// rectangle when enabled). Every placed internal node becomes a group
    /// rectangle keyed by its member names.
    pub fn finish(&mut self, positions: &Positions) -> Layout {
        let mut layout = Layout::default();
        let mut ordered: Vec<(&TreeId, &Rect)> = positions.iter().collect();
        ordered.sort_unstable_by_key(|(id, _)| **id);

        for (&id, rect) in ordered {
            match self.arena.name(id) {
                Some(name) => {
                    let mut point = rect.center();
                    if let Some(rng) = self.rng.as_mut() {
                        point.x += rng.next_f64_centered() * self.jitter_factor * rect.dx;
                        point.y += rng.next_f64_centered() * self.jitter_factor * rect.dy;
                    }
                    layout.positions.insert(name.to_string(), point);
                }
                None => {
                    layout.groups.insert(self.arena.members(id), rect.to_group());
                }
            }
        }
        layout
    }
}
