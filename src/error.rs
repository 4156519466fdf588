//! Error type shared by the layout engine.

/// Failures that abort a layout run.
///
/// Degenerate inputs (no nodes, a single node, only isolated nodes) are not
/// errors; they produce trivial layouts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("cannot build a tree over an empty node set")]
    EmptyNodeSet,

    #[error("combine step made no progress at level {level} ({nodes} nodes remain)")]
    NoProgress { level: usize, nodes: usize },

    #[error("invalid split: ratio {ratio} must lie in [0, 1] and margin {margin} in [0, 0.5)")]
    InvalidSplit { ratio: f64, margin: f64 },

    #[error("invalid layout configuration: {0}")]
    InvalidConfig(String),

    #[error("observation matrix has {rows} rows but {names} row names were given")]
    RowCountMismatch { rows: usize, names: usize },

    #[error("graph node names must match the observation row names")]
    RowNamesMismatch,

    #[error("cannot cluster zero observation rows")]
    EmptyObservations,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
