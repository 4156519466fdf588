//! Binary dendrogram storage.
//!
//! Tree nodes live in an arena and are referred to by `TreeId`. Leaves are
//! allocated first, one per graph node in ascending name order, so comparing
//! two leaf ids compares their names. Internal nodes are appended by `join`
//! and never change afterwards.

use std::collections::{BTreeSet, HashMap};

/// Index of a node in a [`TreeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(pub u32);

impl TreeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A dendrogram node: an original graph node or an ordered pair of subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Leaf(String),
    Internal(TreeId, TreeId),
}

#[derive(Debug, Clone)]
struct TreeEntry {
    node: TreeNode,
    parent: Option<TreeId>,
    /// Number of leaves underneath (1 for a leaf).
    size: usize,
}

/// Arena owning every tree node created during one layout run.
#[derive(Debug, Clone, Default)]
pub struct TreeArena {
    entries: Vec<TreeEntry>,
    leaves: HashMap<String, TreeId>,
}

impl TreeArena {
    /// Create an arena holding one leaf per name.
    ///
    /// Names are sorted first; duplicates collapse to a single leaf.
    pub fn with_leaves<S: AsRef<str>>(names: &[S]) -> Self {
        let mut sorted: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();
        sorted.dedup();

        let mut arena = Self {
            entries: Vec::with_capacity(sorted.len() * 2),
            leaves: HashMap::with_capacity(sorted.len()),
        };
        for name in sorted {
            let id = TreeId(arena.entries.len() as u32);
            arena.entries.push(TreeEntry {
                node: TreeNode::Leaf(name.to_string()),
                parent: None,
                size: 1,
            });
            arena.leaves.insert(name.to_string(), id);
        }
        arena
    }

    /// Total number of tree nodes (leaves and internal).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Leaf ids in name order.
    pub fn leaf_ids(&self) -> impl Iterator<Item = TreeId> {
        (0..self.leaves.len() as u32).map(TreeId)
    }

    /// Leaf id for a graph node name.
    pub fn leaf(&self, name: &str) -> Option<TreeId> {
        self.leaves.get(name).copied()
    }

    pub fn node(&self, id: TreeId) -> &TreeNode {
        &self.entries[id.index()].node
    }

    /// Graph node name of a leaf, None for internal nodes.
    pub fn name(&self, id: TreeId) -> Option<&str> {
        match &self.entries[id.index()].node {
            TreeNode::Leaf(name) => Some(name),
            TreeNode::Internal(..) => None,
        }
    }

    pub fn is_leaf(&self, id: TreeId) -> bool {
        matches!(self.entries[id.index()].node, TreeNode::Leaf(_))
    }

    /// The two children of an internal node.
    pub fn children(&self, id: TreeId) -> Option<(TreeId, TreeId)> {
        match self.entries[id.index()].node {
            TreeNode::Internal(left, right) => Some((left, right)),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn parent(&self, id: TreeId) -> Option<TreeId> {
        self.entries[id.index()].parent
    }

    /// Number of leaves under `id`.
    pub fn size(&self, id: TreeId) -> usize {
        self.entries[id.index()].size
    }

    /// Create the internal node `(left, right)` and make it their parent.
    pub fn join(&mut self, left: TreeId, right: TreeId) -> TreeId {
        debug_assert_ne!(left, right, "a tree node cannot be paired with itself");
        debug_assert!(self.parent(left).is_none(), "{left:?} already has a parent");
        debug_assert!(self.parent(right).is_none(), "{right:?} already has a parent");

        let id = TreeId(self.entries.len() as u32);
        let size = self.size(left) + self.size(right);
        self.entries.push(TreeEntry {
            node: TreeNode::Internal(left, right),
            parent: None,
            size,
        });
        self.entries[left.index()].parent = Some(id);
        self.entries[right.index()].parent = Some(id);
        id
    }

    /// Join `ids` into a balanced subtree by repeated halving.
    ///
    /// Returns the single id unchanged for a one-element slice and None for
    /// an empty one.
    pub fn balanced(&mut self, ids: &[TreeId]) -> Option<TreeId> {
        match ids.len() {
            0 => None,
            1 => Some(ids[0]),
            n => {
                let (left, right) = ids.split_at(n / 2);
                let left = self.balanced(left)?;
                let right = self.balanced(right)?;
                Some(self.join(left, right))
            }
        }
    }

    /// Reset parent pointers so they describe exactly the tree under `root`.
    pub fn reparent_from(&mut self, root: TreeId) {
        for entry in &mut self.entries {
            entry.parent = None;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some((left, right)) = self.children(id) {
                self.entries[left.index()].parent = Some(id);
                self.entries[right.index()].parent = Some(id);
                stack.push(left);
                stack.push(right);
            }
        }
    }

    /// Names of all leaves under `id`.
    pub fn members(&self, id: TreeId) -> BTreeSet<String> {
        let mut members = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match &self.entries[current.index()].node {
                TreeNode::Leaf(name) => {
                    members.insert(name.clone());
                }
                TreeNode::Internal(left, right) => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }
        members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves_follow_name_order() {
        let arena = TreeArena::with_leaves(&["c", "a", "b", "a"]);
        assert_eq!(arena.leaf_count(), 3);
        assert_eq!(arena.leaf("a"), Some(TreeId(0)));
        assert_eq!(arena.leaf("b"), Some(TreeId(1)));
        assert_eq!(arena.leaf("c"), Some(TreeId(2)));
        assert_eq!(arena.name(TreeId(2)), Some("c"));
    }

    #[test]
    fn test_join_sets_parent_and_size() {
        let mut arena = TreeArena::with_leaves(&["a", "b", "c"]);
        let ab = arena.join(TreeId(0), TreeId(1));
        let root = arena.join(ab, TreeId(2));

        assert_eq!(arena.parent(TreeId(0)), Some(ab));
        assert_eq!(arena.parent(ab), Some(root));
        assert_eq!(arena.parent(root), None);
        assert_eq!(arena.size(ab), 2);
        assert_eq!(arena.size(root), 3);
        assert_eq!(arena.children(root), Some((ab, TreeId(2))));
        assert!(!arena.is_leaf(root));
    }

    #[test]
    fn test_members() {
        let mut arena = TreeArena::with_leaves(&["a", "b", "c"]);
        let bc = arena.join(TreeId(1), TreeId(2));
        let members: Vec<String> = arena.members(bc).into_iter().collect();
        assert_eq!(members, vec!["b", "c"]);
        assert_eq!(arena.members(TreeId(0)).len(), 1);
    }

    #[test]
    fn test_balanced_split() {
        let mut arena = TreeArena::with_leaves(&["a", "b", "c"]);
        let ids: Vec<TreeId> = arena.leaf_ids().collect();
        let root = arena.balanced(&ids).unwrap();

        // [a] | [b, c]
        let (left, right) = arena.children(root).unwrap();
        assert_eq!(left, TreeId(0));
        assert_eq!(arena.children(right), Some((TreeId(1), TreeId(2))));
        assert_eq!(arena.balanced(&[]), None);
        assert_eq!(arena.balanced(&[TreeId(0)]), Some(TreeId(0)));
    }

    #[test]
    fn test_reparent_from_root() {
        let mut arena = TreeArena::with_leaves(&["a", "b"]);
        let root = arena.join(TreeId(0), TreeId(1));
        arena.reparent_from(root);
        assert_eq!(arena.parent(TreeId(0)), Some(root));
        assert_eq!(arena.parent(root), None);
    }
}
