//! Node record and nested tree view.
//!
//! # Responsibility
//! - Define the persisted node shape and its JSON field names.
//! - Assemble a flat node listing into a nested tree rooted at the root node.
//!
//! # Invariants
//! - `id` is stable and never reassigned.
//! - Sibling display order is `(ordering, id)` ascending.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node identifier assigned by the store.
pub type NodeId = i64;

/// Reserved id of the single root node.
pub const ROOT_NODE_ID: NodeId = 1;

/// Parent value meaning "top-level". Only the root lives there.
pub const TOP_LEVEL_PARENT_ID: NodeId = 0;

/// One persisted tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Stable node id.
    pub id: NodeId,
    /// Parent node id, or [`TOP_LEVEL_PARENT_ID`] for the root.
    pub parent_id: NodeId,
    /// User-facing label.
    pub title: String,
    /// Position among siblings.
    pub ordering: i64,
}

impl Node {
    /// Returns whether this is the reserved root node.
    pub fn is_root(&self) -> bool {
        self.id == ROOT_NODE_ID
    }
}

/// Nested tree view: one node with its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeItem {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<TreeItem>,
}

impl TreeItem {
    /// Total number of nodes in this subtree, self included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TreeItem::node_count)
            .sum::<usize>()
    }
}

/// Builds the nested tree rooted at `root_id` from a flat node list.
///
/// Children keep `(ordering, id)` order regardless of input order. Nodes whose
/// parent chain does not reach `root_id` are left out. Returns `None` when
/// `root_id` is not in `nodes`.
pub fn build_tree(nodes: Vec<Node>, root_id: NodeId) -> Option<TreeItem> {
    let mut by_parent: HashMap<NodeId, Vec<Node>> = HashMap::new();
    let mut root = None;
    for node in nodes {
        if node.id == root_id {
            root = Some(node);
        } else {
            by_parent.entry(node.parent_id).or_default().push(node);
        }
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|node| (node.ordering, node.id));
    }

    let root = root?;
    Some(attach_children(root, &mut by_parent))
}

fn attach_children(node: Node, by_parent: &mut HashMap<NodeId, Vec<Node>>) -> TreeItem {
    // Removing the entry before recursing means a corrupt cycle cannot loop.
    let children = by_parent
        .remove(&node.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_children(child, by_parent))
        .collect();
    TreeItem { node, children }
}
