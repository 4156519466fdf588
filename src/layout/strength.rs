//! Strongest-influence analysis for one dendrogram level.
//!
//! For every node the analyzer finds the neighbour with the heaviest incoming
//! edge (its "strongest factor") and, inversely, how many nodes each node is
//! the strongest factor for (its fan-in). Edges are scanned in ascending
//! `(from, to)` order and only a strictly heavier edge replaces the current
//! best, so the first heaviest edge in that order wins ties.

use std::collections::{BTreeMap, BTreeSet};

use super::edges::EdgeWeights;
use super::tree::TreeId;

/// Result of [`StrengthStats::compute`].
#[derive(Debug, Clone, Default)]
pub struct StrengthStats {
    /// Heaviest incoming edge weight seen per node (0 when none).
    pub greatest_weight: BTreeMap<TreeId, f64>,
    /// Node -> the neighbour that influences it most.
    pub strongest_factor: BTreeMap<TreeId, TreeId>,
    /// Node -> the nodes it is the strongest factor for.
    pub strongest_factor_inv: BTreeMap<TreeId, BTreeSet<TreeId>>,
    /// Node -> size of its inverse set (fan-in).
    pub strongest_count: BTreeMap<TreeId, usize>,
    /// Nodes that took part in at least one strongest-factor update.
    pub connected: BTreeSet<TreeId>,
    /// Nodes that took part in none.
    pub isolated: BTreeSet<TreeId>,
}

impl StrengthStats {
    /// Analyze `edges` over `nodes`.
    ///
    /// `edges` is expected to be symmetric. Endpoints outside `nodes` are
    /// tolerated and tracked like any other node.
    pub fn compute(nodes: &BTreeSet<TreeId>, edges: &EdgeWeights) -> Self {
        let mut stats = Self {
            greatest_weight: nodes.iter().map(|&n| (n, 0.0)).collect(),
            strongest_factor: BTreeMap::new(),
            strongest_factor_inv: nodes.iter().map(|&n| (n, BTreeSet::new())).collect(),
            strongest_count: nodes.iter().map(|&n| (n, 0)).collect(),
            connected: BTreeSet::new(),
            isolated: BTreeSet::new(),
        };

        for (&(from, to), &weight) in edges {
            let best = stats.greatest_weight.entry(to).or_insert(0.0);
            if weight <= *best {
                continue;
            }
            *best = weight;
            if let Some(previous) = stats.strongest_factor.insert(to, from) {
                if let Some(inv) = stats.strongest_factor_inv.get_mut(&previous) {
                    inv.remove(&to);
                }
                if let Some(count) = stats.strongest_count.get_mut(&previous) {
                    *count = count.saturating_sub(1);
                }
            }
            *stats.strongest_count.entry(from).or_insert(0) += 1;
            stats.strongest_factor_inv.entry(from).or_default().insert(to);
            stats.connected.insert(from);
            stats.connected.insert(to);
        }

        stats.isolated = nodes.difference(&stats.connected).copied().collect();
        stats
    }

    /// Fan-in of `node`.
    pub fn count(&self, node: TreeId) -> usize {
        self.strongest_count.get(&node).copied().unwrap_or(0)
    }

    /// Nodes for which `node` is the strongest factor.
    pub fn spokes(&self, node: TreeId) -> impl Iterator<Item = TreeId> + '_ {
        self.strongest_factor_inv
            .get(&node)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}
