//! Whole-graph simplifications applied before layout.
//!
//! These produce new graphs and never modify their input:
//! - `trim_leaves`: drop edges into pure targets, keeping the regulator core.
//! - `primary_influence`: keep only each node's strongest regulator.
//! - `skeleton`: maximum-|weight| spanning forest.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashSet};

use super::WeightedGraph;

/// Keep only edges whose endpoints both have outgoing edges.
pub fn trim_leaves(graph: &WeightedGraph) -> WeightedGraph {
    let sources: HashSet<&str> = graph.sources().into_iter().collect();
    let mut trimmed = WeightedGraph::new();
    for (from, to, weight) in graph.edges() {
        if sources.contains(from) && sources.contains(to) {
            trimmed.add_edge(from, to, weight);
        }
    }
    trimmed
}

/// Reduce the graph to one influence edge per node.
///
/// Each node's influencer is the neighbour (in either direction) whose edge
/// has the largest `|w|`; the result holds `influencer -> node` with that
/// signed weight. With `connect`, nodes that share an influencer are also
/// chained into a ring of `connect_weight` edges in name order.
pub fn primary_influence(graph: &WeightedGraph, connect: bool, connect_weight: f64) -> WeightedGraph {
    let mut edges: Vec<(&str, &str, f64)> = graph.edges().collect();
    edges.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    // node -> (influencer, weight)
    let mut influences: BTreeMap<&str, (&str, f64)> = BTreeMap::new();
    for &(from, to, weight) in &edges {
        for (a, b) in [(from, to), (to, from)] {
            let stronger = influences
                .get(b)
                .is_none_or(|&(_, current)| current.abs() < weight.abs());
            if stronger {
                influences.insert(b, (a, weight));
            }
        }
    }

    let mut result = WeightedGraph::new();
    for (&node, &(influencer, weight)) in &influences {
        result.add_edge(influencer, node, weight);
    }

    if connect {
        let mut influenced: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (&node, &(influencer, _)) in &influences {
            influenced.entry(influencer).or_default().insert(node);
        }
        for siblings in influenced.values().filter(|s| s.len() > 1) {
            let ring: Vec<&str> = siblings.iter().copied().collect();
            for pair in ring.windows(2) {
                result.add_edge(pair[0], pair[1], connect_weight);
            }
            result.add_edge(ring[ring.len() - 1], ring[0], connect_weight);
        }
    }

    result
}

/// Heap entry ordered by `|weight|`, then by endpoint names for determinism.
struct HeapEdge<'a> {
    magnitude: f64,
    from: &'a str,
    to: &'a str,
    weight: f64,
}

impl PartialEq for HeapEdge<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEdge<'_> {}

impl PartialOrd for HeapEdge<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEdge<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.magnitude
            .total_cmp(&other.magnitude)
            .then_with(|| other.from.cmp(self.from))
            .then_with(|| other.to.cmp(self.to))
    }
}

impl<'a> HeapEdge<'a> {
    fn new((from, to, weight): (&'a str, &'a str, f64)) -> Self {
        Self {
            magnitude: weight.abs(),
            from,
            to,
            weight,
        }
    }
}

/// Maximum-|weight| spanning forest.
///
/// Components are grown one at a time from their heaviest remaining edge,
/// always taking the heaviest frontier edge next. Kept edges retain their
/// original direction and sign.
pub fn skeleton(graph: &WeightedGraph) -> WeightedGraph {
    let mut seeds: Vec<HeapEdge<'_>> = graph.edges().map(HeapEdge::new).collect();
    seeds.sort();

    let mut added: HashSet<&str> = HashSet::new();
    let mut result = WeightedGraph::new();

    while let Some(seed) = seeds.pop() {
        if added.contains(seed.from) && added.contains(seed.to) {
            continue;
        }
        let mut frontier = BinaryHeap::new();
        frontier.push(seed);
        while let Some(edge) = frontier.pop() {
            if added.contains(edge.from) && added.contains(edge.to) {
                continue;
            }
            for endpoint in [edge.from, edge.to] {
                for incident in graph.incident_edges(endpoint) {
                    frontier.push(HeapEdge::new(incident));
                }
            }
            result.add_edge(edge.from, edge.to, edge.weight);
            added.insert(edge.from);
            added.insert(edge.to);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_leaves_keeps_regulator_core() {
        // c is a pure target
        let g = WeightedGraph::from_edges([("a", "b", 1.0), ("b", "a", 2.0), ("a", "c", 3.0)]);
        let trimmed = trim_leaves(&g);

        assert_eq!(trimmed.edge_count(), 2);
        assert!(!trimmed.contains_node("c"));
        assert_eq!(trimmed.edge_weight("b", "a"), Some(2.0));
    }

    #[test]
    fn test_primary_influence_picks_strongest() {
        let g = WeightedGraph::from_edges([("a", "c", 1.0), ("b", "c", -5.0), ("a", "b", 0.5)]);
        let p = primary_influence(&g, false, 1.0);

        // c's strongest influencer is b (|-5| > 1)
        assert_eq!(p.edge_weight("b", "c"), Some(-5.0));
        assert_eq!(p.edge_weight("a", "c"), None);
        // a is influenced most strongly by c through the undirected view
        assert_eq!(p.edge_weight("c", "a"), Some(1.0));
    }

    #[test]
    fn test_primary_influence_connect_ring() {
        // hub influences x, y, z; they should be ringed together
        let g = WeightedGraph::from_edges([("hub", "x", 5.0), ("hub", "y", 5.0), ("hub", "z", 5.0)]);
        let p = primary_influence(&g, true, 0.25);

        assert_eq!(p.edge_weight("x", "y"), Some(0.25));
        assert_eq!(p.edge_weight("y", "z"), Some(0.25));
        assert_eq!(p.edge_weight("z", "x"), Some(0.25));
    }

    #[test]
    fn test_skeleton_is_spanning_forest() {
        // triangle plus a separate pair
        let g = WeightedGraph::from_edges([
            ("a", "b", 3.0),
            ("b", "c", -2.0),
            ("a", "c", 1.0),
            ("x", "y", 1.0),
        ]);
        let s = skeleton(&g);

        assert_eq!(s.node_count(), 5);
        // 5 nodes in 2 components -> 3 edges
        assert_eq!(s.edge_count(), 3);
        assert_eq!(s.edge_weight("a", "b"), Some(3.0));
        assert_eq!(s.edge_weight("b", "c"), Some(-2.0));
        assert_eq!(s.edge_weight("a", "c"), None);
        assert_eq!(s.edge_weight("x", "y"), Some(1.0));
    }

    #[test]
    fn test_skeleton_empty() {
        let s = skeleton(&WeightedGraph::new());
        assert_eq!(s.node_count(), 0);
    }
}
