//! Layout selection by name, for callers that pick a variant at runtime.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;

use super::{
    category_layout, cluster_layout, forest_layout, spoke_layout, tree_layout, Categories, ClusterConfig, GroupRect,
    Layout, LayoutConfig, Observations, SimpleTreeConfig,
};
use crate::error::{LayoutError, Result};
use crate::graph::WeightedGraph;

/// The available layout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMethod {
    Forest,
    Spoke,
    Tree,
    Cluster,
    Category,
}

impl FromStr for LayoutMethod {
    type Err = LayoutError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "forest" => Ok(Self::Forest),
            "spoke" => Ok(Self::Spoke),
            "tree" => Ok(Self::Tree),
            "cluster" => Ok(Self::Cluster),
            "category" => Ok(Self::Category),
            other => Err(LayoutError::InvalidConfig(format!("unknown layout method '{other}'"))),
        }
    }
}

/// Every option a layout run may take; each variant reads what it needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    #[serde(flatten)]
    pub layout: LayoutConfig,
    pub tree: SimpleTreeConfig,
    pub cluster: ClusterConfig,
    /// Node name -> category label, for the category layout.
    pub categories: Option<Categories>,
}

/// Output of [`run_layout`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRun {
    pub layout: Layout,
    /// Per-category outlines; only filled by the category layout.
    pub categories: BTreeMap<String, GroupRect>,
}

/// Run `method` on `graph`.
///
/// `observations` is only used by the cluster layout.
pub fn run_layout(
    graph: &WeightedGraph,
    method: LayoutMethod,
    options: &LayoutOptions,
    observations: Option<&Observations>,
) -> Result<LayoutRun> {
    let config = &options.layout;
    let layout = match method {
        LayoutMethod::Forest => forest_layout(graph, config)?,
        LayoutMethod::Spoke => spoke_layout(graph, config)?,
        LayoutMethod::Tree => tree_layout(graph, config, &options.tree)?,
        LayoutMethod::Cluster => cluster_layout(graph, config, &options.cluster, observations)?,
        LayoutMethod::Category => {
            let result = category_layout(graph, config, options.categories.as_ref())?;
            return Ok(LayoutRun {
                layout: result.layout,
                categories: result.rectangles,
            });
        }
    };
    Ok(LayoutRun {
        layout,
        categories: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!("forest".parse::<LayoutMethod>().unwrap(), LayoutMethod::Forest);
        assert_eq!("Spoke".parse::<LayoutMethod>().unwrap(), LayoutMethod::Spoke);
        assert!(matches!(
            "force".parse::<LayoutMethod>(),
            Err(LayoutError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_every_method_positions_every_node() {
        let mut graph = WeightedGraph::from_edges([
            ("tf", "g1", 2.0),
            ("tf", "g2", -1.0),
            ("tf", "g3", 1.0),
            ("g3", "g4", 0.5),
        ]);
        graph.add_node("orphan");

        let options = LayoutOptions::default();
        for method in [
            LayoutMethod::Forest,
            LayoutMethod::Spoke,
            LayoutMethod::Tree,
            LayoutMethod::Cluster,
            LayoutMethod::Category,
        ] {
            let run = run_layout(&graph, method, &options, None).unwrap();
            assert_eq!(run.layout.len(), 6, "{method:?}");
        }
    }
}
