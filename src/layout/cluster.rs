//! Cluster layout: the dendrogram comes from clustering observation rows.
//!
//! Instead of grouping by edges, nodes are grouped by how similar their
//! observation rows are (expression values per gene, for example). Without
//! explicit observations each node's row of the absolute, symmetrized
//! adjacency matrix is used. The linkage's merge order is turned directly
//! into the binary tree.

use std::collections::BTreeSet;

use nalgebra::DMatrix;
use serde::Deserialize;

use super::edges::symmetrize;
use super::geneology::compute_geneology;
use super::linkage::{linkage, Linkage, Merge};
use super::tree::{TreeArena, TreeId};
use super::{leaf_arena, place, Layout, LayoutConfig};
use crate::error::{LayoutError, Result};
use crate::graph::WeightedGraph;

/// Numeric observations, one row per graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    pub matrix: DMatrix<f64>,
    pub row_names: Vec<String>,
}

impl Observations {
    /// Build from row-major values.
    pub fn from_row_slice(values: &[f64], ncols: usize, row_names: Vec<String>) -> Result<Self> {
        let rows = if ncols == 0 { 0 } else { values.len() / ncols };
        if ncols == 0 || rows * ncols != values.len() {
            return Err(LayoutError::InvalidConfig(format!(
                "{} values cannot form rows of {ncols} columns",
                values.len()
            )));
        }
        Ok(Self {
            matrix: DMatrix::from_row_slice(rows, ncols, values),
            row_names,
        })
    }

    /// Symmetric `|w|` adjacency over the graph's nodes in name order.
    pub fn from_adjacency(graph: &WeightedGraph) -> Self {
        let row_names = graph.node_names();
        let n = row_names.len();
        let mut matrix = DMatrix::<f64>::zeros(n, n);
        let index = |name: &str| row_names.binary_search_by(|probe| probe.as_str().cmp(name)).ok();
        for (from, to, weight) in graph.edges() {
            if let (Some(i), Some(j)) = (index(from), index(to)) {
                matrix[(i, j)] += weight.abs();
                matrix[(j, i)] += weight.abs();
            }
        }
        Self { matrix, row_names }
    }

    fn validate(&self, graph: &WeightedGraph) -> Result<()> {
        let rows = self.matrix.nrows();
        if rows != self.row_names.len() {
            return Err(LayoutError::RowCountMismatch {
                rows,
                names: self.row_names.len(),
            });
        }
        if rows == 0 {
            return Err(LayoutError::EmptyObservations);
        }
        let names: BTreeSet<&str> = self.row_names.iter().map(String::as_str).collect();
        let nodes = graph.node_names();
        if names.len() != rows || names.len() != nodes.len() || !nodes.iter().all(|n| names.contains(n.as_str())) {
            return Err(LayoutError::RowNamesMismatch);
        }
        Ok(())
    }
}

/// Options specific to [`cluster_layout`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Linkage rule (default: Ward).
    pub linkage: Linkage,
    /// Margin around each cluster, replacing the general margin (default: 0.2).
    pub margin: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            linkage: Linkage::Ward,
            margin: 0.2,
        }
    }
}

/// Lay out `graph` along the dendrogram of its observation rows.
pub fn cluster_layout(
    graph: &WeightedGraph,
    config: &LayoutConfig,
    cluster: &ClusterConfig,
    observations: Option<&Observations>,
) -> Result<Layout> {
    let config = config.with_margin(cluster.margin);
    config.validate()?;

    // nothing to place, whatever observations came with it
    if graph.node_count() == 0 {
        return Ok(Layout::default());
    }

    let adjacency;
    let observations = match observations {
        Some(observations) => observations,
        None => {
            adjacency = Observations::from_adjacency(graph);
            &adjacency
        }
    };
    observations.validate(graph)?;

    let mut arena = leaf_arena(graph);
    let mut rows: Vec<TreeId> = Vec::with_capacity(observations.row_names.len());
    for name in &observations.row_names {
        rows.push(arena.leaf(name).ok_or(LayoutError::RowNamesMismatch)?);
    }

    let merges = linkage(&observations.matrix, cluster.linkage);
    let root = join_merges(&mut arena, rows, &merges)?;

    let edges = symmetrize(graph, &arena);
    let levels = compute_geneology(&mut arena, root, &edges);
    tracing::debug!(
        nodes = graph.node_count(),
        rows = observations.row_names.len(),
        columns = observations.matrix.ncols(),
        linkage = ?cluster.linkage,
        levels = levels.len(),
        "cluster layout"
    );
    place(&arena, root, &levels, &config)
}

/// Replay `merges` on `arena`, where merge `k` creates cluster `rows.len() + k`.
///
/// Returns the last cluster created, or the only row when there are no merges.
fn join_merges(arena: &mut TreeArena, rows: Vec<TreeId>, merges: &[Merge]) -> Result<TreeId> {
    let mut clusters = rows;
    clusters.reserve(merges.len());
    for merge in merges {
        let (Some(&left), Some(&right)) = (clusters.get(merge.left), clusters.get(merge.right)) else {
            return Err(LayoutError::InvalidConfig(format!(
                "merge refers to cluster {} but only {} exist",
                merge.left.max(merge.right),
                clusters.len()
            )));
        };
        clusters.push(arena.join(left, right));
    }
    clusters.last().copied().ok_or(LayoutError::EmptyObservations)
}
