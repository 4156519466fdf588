//! Spatial indexing for hit testing on computed layouts.
//!
//! This module provides an R-tree based index for nearest-node and range
//! queries over a layout's node positions.

mod index;

pub use index::{LayoutIndex, NodePoint};
