//! Agglomerative hierarchical clustering over observation rows.
//!
//! # Algorithm Overview
//!
//! 1. Compute Euclidean distances between every pair of rows.
//! 2. Repeatedly merge the closest pair of active clusters. Distances from
//!    the merged cluster to every other cluster follow the Lance-Williams
//!    update for the chosen [`Linkage`].
//! 3. Merge `k` creates cluster id `n + k`, where `n` is the row count, so
//!    the merge list reads like a standard linkage matrix.
//!
//! This is the naive O(n³) scheme; it is meant for the few hundred rows of a
//! regulatory network, not for large data sets.

use nalgebra::DMatrix;
use serde::Deserialize;

/// Cluster distance update rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Linkage {
    Single,
    Complete,
    Average,
    /// Minimum variance merge.
    #[default]
    Ward,
}

/// One merge of two clusters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// The smaller of the two merged cluster ids.
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Rows under the new cluster.
    pub size: usize,
}

/// Pairwise Euclidean distances between the rows of `observations`.
pub fn row_distances(observations: &DMatrix<f64>) -> DMatrix<f64> {
    let n = observations.nrows();
    let mut distances = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (&observations.row(i) - &observations.row(j)).norm();
            distances[(i, j)] = d;
            distances[(j, i)] = d;
        }
    }
    distances
}

/// Cluster the rows of `observations`, returning `nrows - 1` merges.
///
/// Ties between equally close pairs go to the pair with the lowest cluster
/// ids.
pub fn linkage(observations: &DMatrix<f64>, method: Linkage) -> Vec<Merge> {
    let n = observations.nrows();
    if n < 2 {
        return Vec::new();
    }

    // Slots 0..n hold active clusters; a merged cluster reuses the lower slot.
    let mut distances = row_distances(observations);
    let mut cluster_id: Vec<usize> = (0..n).collect();
    let mut size: Vec<usize> = vec![1; n];
    let mut active: Vec<bool> = vec![true; n];
    let mut merges = Vec::with_capacity(n - 1);

    for step in 0..(n - 1) {
        let Some((a, b)) = closest_pair(&distances, &active, &cluster_id) else {
            break;
        };
        let distance = distances[(a, b)];
        let (size_a, size_b) = (size[a], size[b]);

        for k in 0..n {
            if !active[k] || k == a || k == b {
                continue;
            }
            let updated = lance_williams(
                method,
                distances[(a, k)],
                distances[(b, k)],
                distance,
                size_a,
                size_b,
                size[k],
            );
            distances[(a, k)] = updated;
            distances[(k, a)] = updated;
        }

        let (left, right) = if cluster_id[a] < cluster_id[b] {
            (cluster_id[a], cluster_id[b])
        } else {
            (cluster_id[b], cluster_id[a])
        };
        merges.push(Merge {
            left,
            right,
            distance,
            size: size_a + size_b,
        });

        active[b] = false;
        size[a] = size_a + size_b;
        cluster_id[a] = n + step;
    }
    merges
}

/// Closest pair of active slots, ties broken by `(min id, max id)`.
fn closest_pair(distances: &DMatrix<f64>, active: &[bool], cluster_id: &[usize]) -> Option<(usize, usize)> {
    let n = active.len();
    let mut best: Option<(f64, (usize, usize), (usize, usize))> = None;
    for i in 0..n {
        if !active[i] {
            continue;
        }
        for j in (i + 1)..n {
            if !active[j] {
                continue;
            }
            let d = distances[(i, j)];
            let ids = (cluster_id[i].min(cluster_id[j]), cluster_id[i].max(cluster_id[j]));
            let better = match best {
                None => true,
                Some((best_d, best_ids, _)) => d.total_cmp(&best_d).then(ids.cmp(&best_ids)).is_lt(),
            };
            if better {
                best = Some((d, ids, (i, j)));
            }
        }
    }
    best.map(|(_, _, slots)| slots)
}

/// Distance from the union of clusters `a` and `b` to cluster `k`.
fn lance_williams(method: Linkage, d_ak: f64, d_bk: f64, d_ab: f64, n_a: usize, n_b: usize, n_k: usize) -> f64 {
    match method {
        Linkage::Single => d_ak.min(d_bk),
        Linkage::Complete => d_ak.max(d_bk),
        Linkage::Average => {
            let (n_a, n_b) = (n_a as f64, n_b as f64);
            (n_a * d_ak + n_b * d_bk) / (n_a + n_b)
        }
        Linkage::Ward => {
            let (n_a, n_b, n_k) = (n_a as f64, n_b as f64, n_k as f64);
            let total = n_a + n_b + n_k;
            let squared = ((n_a + n_k) * d_ak * d_ak + (n_b + n_k) * d_bk * d_bk - n_k * d_ab * d_ab) / total;
            squared.max(0.0).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(rows: &[[f64; 2]]) -> DMatrix<f64> {
        DMatrix::from_fn(rows.len(), 2, |i, j| rows[i][j])
    }

    #[test]
    fn test_row_distances() {
        let d = row_distances(&points(&[[0.0, 0.0], [3.0, 4.0]]));
        assert_eq!(d[(0, 1)], 5.0);
        assert_eq!(d[(1, 0)], 5.0);
        assert_eq!(d[(0, 0)], 0.0);
    }

    #[test]
    fn test_single_linkage_chain() {
        let obs = points(&[[0.0, 0.0], [1.0, 0.0], [10.0, 0.0], [11.5, 0.0]]);
        let merges = linkage(&obs, Linkage::Single);
        assert_eq!(merges.len(), 3);
        assert_eq!((merges[0].left, merges[0].right), (0, 1));
        assert_eq!((merges[1].left, merges[1].right), (2, 3));
        assert_eq!((merges[2].left, merges[2].right), (4, 5));
        assert_eq!(merges[2].size, 4);
        // single linkage: nearest members 1.0 and 10.0
        assert!((merges[2].distance - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_complete_and_average_distances() {
        let obs = points(&[[0.0, 0.0], [1.0, 0.0], [5.0, 0.0]]);
        let complete = linkage(&obs, Linkage::Complete);
        assert!((complete[1].distance - 5.0).abs() < 1e-12);
        let average = linkage(&obs, Linkage::Average);
        assert!((average[1].distance - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_ward_matches_centroid_formula() {
        // Ward distance between {0,1} and {2} on a line:
        // sqrt(2 * n_ab * n_c / (n_ab + n_c)) * |centroid_ab - c| = sqrt(4/3) * 4.5
        let obs = points(&[[0.0, 0.0], [1.0, 0.0], [5.0, 0.0]]);
        let merges = linkage(&obs, Linkage::Ward);
        let expected = (4.0f64 / 3.0).sqrt() * 4.5;
        assert!((merges[1].distance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ties_pick_lowest_ids() {
        let obs = DMatrix::<f64>::identity(4, 4);
        let merges = linkage(&obs, Linkage::Ward);
        assert_eq!(merges.len(), 3);
        assert_eq!((merges[0].left, merges[0].right), (0, 1));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(linkage(&DMatrix::<f64>::zeros(0, 3), Linkage::Ward).is_empty());
        assert!(linkage(&DMatrix::<f64>::zeros(1, 3), Linkage::Ward).is_empty());
    }
}
