//! RegNet Layout - WASM Module
//!
//! Force-free hierarchical layouts for gene regulatory networks. Nodes are
//! grouped into a binary dendrogram by how strongly they influence each
//! other, and a square is bisected along that dendrogram to place them.
//! The crate compiles to WebAssembly and exposes a JavaScript-friendly API
//! via wasm-bindgen; everything is also usable as a plain Rust library.
//!
//! # Architecture
//!
//! - `graph`: weighted directed graph on petgraph's StableGraph, plus graph
//!   simplifications (trimming, primary influence, skeleton)
//! - `layout`: dendrogram construction, rectangle assignment and the layout
//!   variants (forest, spoke, tree, cluster, category)
//! - `spatial`: R-tree index over a computed layout for hit testing
//! - `error`: the shared error type

use std::collections::BTreeMap;

use js_sys::Float64Array;
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod spatial;

pub use error::{LayoutError, Result};
pub use graph::WeightedGraph;
pub use layout::{Layout, LayoutConfig};

use layout::{fit_side_length, run_layout, GroupRect, LayoutMethod, LayoutOptions, LayoutRun, Observations, Point};
use spatial::LayoutIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for JavaScript.
///
/// Holds a graph under construction and the most recent layout computed
/// over it, with a spatial index for hit testing on that layout.
#[wasm_bindgen]
pub struct RegNetLayoutWasm {
    graph: WeightedGraph,
    last: LayoutRun,
    index: LayoutIndex,
}

#[wasm_bindgen]
impl RegNetLayoutWasm {
    /// Create an empty graph.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            graph: WeightedGraph::new(),
            last: LayoutRun::default(),
            index: LayoutIndex::default(),
        }
    }

    // =========================================================================
    // Graph Operations
    // =========================================================================

    /// Add or overwrite the edge `from -> to`. Self-loops are ignored.
    ///
    /// Returns false when the edge was ignored.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, from: &str, to: &str, weight: f64) -> bool {
        self.graph.add_edge(from, to, weight)
    }

    /// Add a node without edges.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, name: &str) {
        self.graph.add_node(name);
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, name: &str) -> bool {
        self.graph.remove_node(name)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Remove all nodes, edges and the last layout.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.last = LayoutRun::default();
        self.index = LayoutIndex::default();
    }

    /// Side length suited to the current graph size.
    #[wasm_bindgen(js_name = fitSideLength)]
    pub fn fit_side_length(&self) -> f64 {
        fit_side_length(&self.graph)
    }

    // =========================================================================
    // Layout Algorithms
    // =========================================================================

    /// Compute a layout of the current graph.
    ///
    /// # Arguments
    ///
    /// * `method` - One of "forest", "spoke", "tree", "cluster", "category"
    /// * `options` - Optional object: `sideLength`, `jitter`, `jitterFactor`,
    ///   `seed`, `margin`, `tree: { levelLimit, heuristic }`,
    ///   `cluster: { linkage, margin }`, `categories: { node: label }`
    ///
    /// Returns `{ positions: { node: { x, y } }, groups: [{ members, rect }], categories: { label: rect } }`.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&mut self, method: &str, options: JsValue) -> std::result::Result<JsValue, JsError> {
        let method: LayoutMethod = method.parse().map_err(to_js_error)?;
        let options = parse_options(options)?;
        let run = run_layout(&self.graph, method, &options, None).map_err(to_js_error)?;
        self.store(run)
    }

    /// Compute a cluster layout from caller-supplied observations.
    ///
    /// `matrix` holds the observations row-major with `ncols` columns and
    /// one row per entry of `row_names`.
    #[wasm_bindgen(js_name = computeClusterLayout)]
    pub fn compute_cluster_layout(
        &mut self,
        matrix: &[f64],
        ncols: usize,
        row_names: Vec<String>,
        options: JsValue,
    ) -> std::result::Result<JsValue, JsError> {
        let options = parse_options(options)?;
        let observations = Observations::from_row_slice(matrix, ncols, row_names).map_err(to_js_error)?;
        let run = run_layout(&self.graph, LayoutMethod::Cluster, &options, Some(&observations)).map_err(to_js_error)?;
        self.store(run)
    }

    // =========================================================================
    // Last Layout Access
    // =========================================================================

    /// Node names of the last layout, in the order used by `positionsArray`.
    #[wasm_bindgen(js_name = nodeNames)]
    pub fn node_names(&self) -> Vec<String> {
        self.last.layout.positions.keys().cloned().collect()
    }

    /// Positions of the last layout as `[x0, y0, x1, y1, ...]` in name order.
    #[wasm_bindgen(js_name = positionsArray)]
    pub fn positions_array(&self) -> Float64Array {
        let flat: Vec<f64> = self
            .last
            .layout
            .positions
            .values()
            .flat_map(|p| [p.x, p.y])
            .collect();
        Float64Array::from(&flat[..])
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Nodes of the last layout inside the rectangle.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<String> {
        owned(self.index.in_rect(min_x, min_y, max_x, max_y))
    }

    /// Nodes under a drag selection, squared up to at least `min_side`.
    #[wasm_bindgen(js_name = nodesInSelection)]
    pub fn nodes_in_selection(&self, x0: f64, y0: f64, x1: f64, y1: f64, min_side: f64) -> Vec<String> {
        owned(self.index.nodes_in_selection((x0, y0), (x1, y1), min_side))
    }

    /// Nearest node of the last layout, if any lies within `max_distance`.
    #[wasm_bindgen(js_name = nearestNode)]
    pub fn nearest_node(&self, x: f64, y: f64, max_distance: f64) -> Option<String> {
        self.index.nearest_within(x, y, max_distance).map(str::to_string)
    }
}

impl RegNetLayoutWasm {
    fn store(&mut self, run: LayoutRun) -> std::result::Result<JsValue, JsError> {
        self.index = LayoutIndex::new(&run.layout);
        self.last = run;
        let output = LayoutOutput::new(&self.last);
        output
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| JsError::new(&err.to_string()))
    }
}

impl Default for RegNetLayoutWasm {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Boundary Helpers
// =============================================================================

/// A group as handed to JavaScript.
#[derive(Debug, Serialize)]
struct GroupOutput<'a> {
    members: Vec<&'a str>,
    rect: GroupRect,
}

/// A layout run as handed to JavaScript.
#[derive(Debug, Serialize)]
struct LayoutOutput<'a> {
    positions: &'a BTreeMap<String, Point>,
    groups: Vec<GroupOutput<'a>>,
    categories: &'a BTreeMap<String, GroupRect>,
}

impl<'a> LayoutOutput<'a> {
    fn new(run: &'a LayoutRun) -> Self {
        let groups = run
            .layout
            .groups
            .iter()
            .map(|(members, rect)| GroupOutput {
                members: members.iter().map(String::as_str).collect(),
                rect: *rect,
            })
            .collect();
        Self {
            positions: &run.layout.positions,
            groups,
            categories: &run.categories,
        }
    }
}

fn parse_options(options: JsValue) -> std::result::Result<LayoutOptions, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(LayoutOptions::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(|err| {
        let message = format!("invalid layout options: {err}");
        web_sys::console::warn_1(&message.as_str().into());
        JsError::new(&message)
    })
}

fn to_js_error(err: LayoutError) -> JsError {
    let message = format!("layout failed: {err}");
    web_sys::console::warn_1(&message.as_str().into());
    JsError::new(&message)
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}
