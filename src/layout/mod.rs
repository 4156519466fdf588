//! Force-free hierarchical layouts.
//!
//! Every layout variant builds a binary dendrogram over the graph's nodes and
//! then bisects a square top-down along that dendrogram, so nodes that were
//! grouped early end up in small neighbouring rectangles. The variants differ
//! only in how the dendrogram is built.
//!
//! # Pipeline
//!
//! 1. Allocate one tree leaf per graph node ([`tree::TreeArena`]).
//! 2. Build the dendrogram and its levels ([`builder::get_subtree`] or a
//!    one-shot tree followed by [`geneology::compute_geneology`]).
//! 3. Assign rectangles root to leaves ([`assign::PositionAssigner`]).
//! 4. Report leaf centres as node positions and internal rectangles as groups.

pub mod assign;
pub mod builder;
pub mod category;
pub mod cluster;
pub mod edges;
pub mod forest;
pub mod geneology;
pub mod linkage;
pub mod method;
pub mod rect;
pub mod rng;
pub mod simple_tree;
pub mod spoke;
pub mod strength;
pub mod tree;

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::error::{LayoutError, Result};
use crate::graph::WeightedGraph;
use assign::PositionAssigner;
use edges::Level;
use tree::{TreeArena, TreeId};

pub use category::{category_layout, default_categories, fill_in_categories, Categories, CategoryLayout};
pub use cluster::{cluster_layout, ClusterConfig, Observations};
pub use forest::forest_layout;
pub use linkage::Linkage;
pub use method::{run_layout, LayoutMethod, LayoutOptions, LayoutRun};
pub use rect::{GroupRect, Point};
pub use simple_tree::tree_layout;
pub use spoke::spoke_layout;

// =============================================================================
// Configuration
// =============================================================================

/// Options shared by every layout variant.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Side of the square the layout fills (default: 1000.0).
    pub side_length: f64,
    /// Perturb split ratios and leaf points (default: false).
    pub jitter: bool,
    /// Jitter amplitude as a fraction of the split or leaf extent (default: 0.1).
    pub jitter_factor: f64,
    /// Seed for the jitter generator (default: 0).
    pub seed: u64,
    /// Fraction of each child's half extent left empty around it (default: 0.0).
    pub margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            side_length: 1000.0,
            jitter: false,
            jitter_factor: 0.1,
            seed: 0,
            margin: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Same configuration with a different margin.
    pub fn with_margin(&self, margin: f64) -> Self {
        Self { margin, ..self.clone() }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.side_length.is_finite() || self.side_length <= 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "side length must be positive, got {}",
                self.side_length
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_factor) {
            return Err(LayoutError::InvalidConfig(format!(
                "jitter factor must lie in [0, 1], got {}",
                self.jitter_factor
            )));
        }
        if !(0.0..0.5).contains(&self.margin) {
            return Err(LayoutError::InvalidConfig(format!(
                "margin must lie in [0, 0.5), got {}",
                self.margin
            )));
        }
        Ok(())
    }
}

/// Options for [`tree_layout`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleTreeConfig {
    /// Maximum influence path length (default: 5).
    pub level_limit: usize,
    /// Only look for split points near the middle (default: true).
    /// When false the whole range is scanned.
    pub heuristic: bool,
}

impl Default for SimpleTreeConfig {
    fn default() -> Self {
        Self {
            level_limit: 5,
            heuristic: true,
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// Node positions plus the rectangle of every multi-member group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub positions: BTreeMap<String, Point>,
    pub groups: BTreeMap<BTreeSet<String>, GroupRect>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }
}

/// Side length suited to the graph's size, clamped to `[200, 1000]`.
pub fn fit_side_length(graph: &WeightedGraph) -> f64 {
    let estimate = 2 * (graph.edge_count() / 4 + graph.node_count());
    estimate.clamp(200, 1000) as f64
}

/// Leaf arena over the graph's node names.
fn leaf_arena(graph: &WeightedGraph) -> TreeArena {
    TreeArena::with_leaves(&graph.node_names())
}

/// Assign rectangles from `root` down through `levels` and collect the layout.
fn place(arena: &TreeArena, root: TreeId, levels: &[Level], config: &LayoutConfig) -> Result<Layout> {
    let mut assigner = PositionAssigner::new(arena, config);
    let positions = assigner.assign(root, levels)?;
    Ok(assigner.finish(&positions))
}
