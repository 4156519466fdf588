//! R-tree over the node positions of a computed layout.
//!
//! Provides O(log n) hit testing on a finished [`Layout`]:
//! - Nearest node (optionally within a distance)
//! - Nodes inside a rectangle or radius
//! - Drag selection, squared up the way the viewer draws it

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::layout::Layout;

/// A named node position stored in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Spatial index over one layout's node positions.
#[derive(Debug, Default)]
pub struct LayoutIndex {
    tree: RTree<NodePoint>,
}

impl LayoutIndex {
    /// Bulk-load every position of `layout`.
    pub fn new(layout: &Layout) -> Self {
        let points: Vec<NodePoint> = layout
            .positions
            .iter()
            .map(|(name, point)| NodePoint {
                name: name.clone(),
                x: point.x,
                y: point.y,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn nearest(&self, x: f64, y: f64) -> Option<&str> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.name.as_str())
    }

    /// Nearest node no further than `max_distance` from `(x, y)`.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<&str> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.name.as_str())
    }

    /// Nodes inside the rectangle (bounds inclusive), in name order.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<&str> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut names: Vec<&str> = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| point.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Nodes within `radius` of `(x, y)`, in name order.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Nodes under a drag selection from `start` to `end`.
    ///
    /// The selection is a square anchored at the minimum corner whose side is
    /// the larger drag extent, but never less than `min_side`.
    pub fn nodes_in_selection(&self, start: (f64, f64), end: (f64, f64), min_side: f64) -> Vec<&str> {
        let (min_x, max_x) = (start.0.min(end.0), start.0.max(end.0));
        let (min_y, max_y) = (start.1.min(end.1), start.1.max(end.1));
        let side = (max_x - min_x).max(max_y - min_y).max(min_side);
        self.in_rect(min_x, min_y, min_x + side, min_y + side)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
