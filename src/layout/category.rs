//! Category layout: caller-labelled groups laid out as blocks.
//!
//! Nodes sharing a category label are first combined among themselves with
//! the default pairing step, then the per-category subtrees are combined
//! into one tree. Each category therefore ends up in one contiguous block,
//! and the largest single-category group rectangle is reported per label.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::builder::{get_subtree, PairCombine};
use super::edges::{combine_edge_weights, restrict, symmetrize};
use super::geneology::compute_geneology;
use super::rect::GroupRect;
use super::tree::TreeId;
use super::{leaf_arena, place, Layout, LayoutConfig};
use crate::error::Result;
use crate::graph::WeightedGraph;

/// Node name -> category label.
pub type Categories = BTreeMap<String, String>;

/// A category layout plus one outline per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryLayout {
    pub layout: Layout,
    /// The category every node was laid out under.
    pub assignments: Categories,
    /// Largest group rectangle whose members all share the category.
    /// Categories with a single member have none.
    pub rectangles: BTreeMap<String, GroupRect>,
}

/// Label nodes by the sign balance of their edges.
///
/// Every incident edge counts +1 (non-negative weight) or -1. Nodes with
/// `|count| > 1` are labelled `sign · ⌊log2(|count| + 1)⌋`; the rest are left
/// unlabelled.
pub fn default_categories(graph: &WeightedGraph) -> Categories {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for (from, to, weight) in graph.edges() {
        let sign = if weight.is_sign_negative() { -1 } else { 1 };
        for node in [from, to] {
            *counts.entry(node).or_insert(0) += sign;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| count.abs() > 1)
        .map(|(node, count)| {
            let magnitude = ((count.abs() + 1) as f64).log2().trunc() as i64;
            (node.to_string(), (magnitude * count.signum()).to_string())
        })
        .collect()
}

/// Give every unlabelled node its own category `"{name}_{index}"`, where
/// `index` is the node's position in name order.
pub fn fill_in_categories(categories: &Categories, graph: &WeightedGraph) -> Categories {
    graph
        .node_names()
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let category = categories
                .get(&name)
                .cloned()
                .unwrap_or_else(|| format!("{name}_{index}"));
            (name, category)
        })
        .collect()
}

/// Lay out `graph` with each category kept together.
///
/// Without `categories`, [`default_categories`] is used. Labels for names
/// that are not graph nodes are ignored.
pub fn category_layout(
    graph: &WeightedGraph,
    config: &LayoutConfig,
    categories: Option<&Categories>,
) -> Result<CategoryLayout> {
    config.validate()?;
    if graph.node_count() == 0 {
        return Ok(CategoryLayout::default());
    }

    let assignments = match categories {
        Some(categories) => fill_in_categories(categories, graph),
        None => fill_in_categories(&default_categories(graph), graph),
    };

    let mut arena = leaf_arena(graph);
    let edges = symmetrize(graph, &arena);

    let mut members_by_category: BTreeMap<&str, BTreeSet<TreeId>> = BTreeMap::new();
    for (name, category) in &assignments {
        if let Some(leaf) = arena.leaf(name) {
            members_by_category.entry(category.as_str()).or_default().insert(leaf);
        }
    }

    let mut mapping: HashMap<TreeId, TreeId> = HashMap::with_capacity(arena.leaf_count());
    let mut subtrees: BTreeSet<TreeId> = BTreeSet::new();
    for members in members_by_category.values() {
        let member_edges = restrict(&edges, members);
        let subtree = get_subtree(&mut arena, members.clone(), member_edges, &PairCombine)?;
        for &member in members {
            mapping.insert(member, subtree.root);
        }
        subtrees.insert(subtree.root);
    }
    let group_edges = combine_edge_weights(&edges, &mapping);
    let root = get_subtree(&mut arena, subtrees, group_edges, &PairCombine)?.root;
    let levels = compute_geneology(&mut arena, root, &edges);

    tracing::debug!(
        nodes = graph.node_count(),
        categories = members_by_category.len(),
        levels = levels.len(),
        "category layout"
    );
    let layout = place(&arena, root, &levels, config)?;
    let rectangles = category_rectangles(&layout, &assignments);
    Ok(CategoryLayout {
        layout,
        assignments,
        rectangles,
    })
}

/// Largest single-category group per category, visiting groups by size.
fn category_rectangles(layout: &Layout, assignments: &Categories) -> BTreeMap<String, GroupRect> {
    let mut by_size: Vec<(&BTreeSet<String>, &GroupRect)> = layout.groups.iter().collect();
    by_size.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut rectangles = BTreeMap::new();
    for (members, rect) in by_size {
        if members.len() < 2 {
            continue;
        }
        let labels: BTreeSet<&String> = members.iter().filter_map(|m| assignments.get(m)).collect();
        if labels.len() != 1 {
            continue;
        }
        if let Some(label) = labels.first() {
            rectangles.insert((*label).clone(), *rect);
        }
    }
    rectangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> Categories {
        pairs.iter().map(|(n, c)| (n.to_string(), c.to_string())).collect()
    }

    #[test]
    fn test_default_categories_by_sign_balance() {
        let mut graph = WeightedGraph::new();
        for target in ["a", "b", "c"] {
            graph.add_edge("up", target, 1.0);
        }
        for target in ["d", "e", "f", "g", "h", "i", "j"] {
            graph.add_edge("down", target, -2.0);
        }
        let categories = default_categories(&graph);

        // 3 positive edges: log2(4) = 2
        assert_eq!(categories["up"], "2");
        // 7 negative edges: -log2(8) = -3
        assert_eq!(categories["down"], "-3");
        // single-edge targets stay unlabelled
        assert!(!categories.contains_key("a"));
    }

    #[test]
    fn test_fill_in_uses_name_order_index() {
        let mut graph = WeightedGraph::new();
        for name in ["b", "a", "c"] {
            graph.add_node(name);
        }
        let filled = fill_in_categories(&labels(&[("b", "x")]), &graph);
        assert_eq!(filled, labels(&[("a", "a_0"), ("b", "x"), ("c", "c_2")]));
    }

    #[test]
    fn test_categories_stay_together() {
        let graph = WeightedGraph::from_edges([
            ("a1", "b1", 5.0),
            ("a2", "b2", 5.0),
            ("a1", "a2", 0.5),
            ("b1", "b2", 0.5),
        ]);
        let categories = labels(&[("a1", "A"), ("a2", "A"), ("b1", "B"), ("b2", "B")]);
        let result = category_layout(&graph, &LayoutConfig::default(), Some(&categories)).unwrap();

        assert_eq!(result.layout.len(), 4);
        assert_eq!(result.rectangles.len(), 2);
        for (category, rect) in &result.rectangles {
            for (name, label) in &result.assignments {
                let inside = rect.contains(result.layout.positions[name]);
                assert_eq!(inside, label == category, "{name} vs category {category}");
            }
        }
    }

    #[test]
    fn test_unlabelled_nodes_get_own_category() {
        let graph = WeightedGraph::from_edges([("x", "y", 1.0), ("y", "z", 1.0)]);
        let result = category_layout(&graph, &LayoutConfig::default(), Some(&Categories::new())).unwrap();
        assert_eq!(result.layout.len(), 3);
        assert_eq!(result.assignments["y"], "y_1");
        assert!(result.rectangles.is_empty());
    }

    #[test]
    fn test_default_categories_layout() {
        let mut graph = WeightedGraph::new();
        for target in ["a", "b", "c"] {
            graph.add_edge("hub", target, 1.0);
        }
        let result = category_layout(&graph, &LayoutConfig::default(), None).unwrap();
        assert_eq!(result.layout.len(), 4);
        assert_eq!(result.assignments["hub"], "2");
    }
}
