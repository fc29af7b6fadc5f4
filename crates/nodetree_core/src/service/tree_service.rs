//! Node tree use-case service.
//!
//! # Responsibility
//! - Validate tree invariants above the repository layer.
//! - Provide list, create, rename, delete-subtree, move, and reorder.
//!
//! # Invariants
//! - The root node is never deleted or moved.
//! - Parents must exist; the top-level sentinel is not a valid new parent.
//! - Move operations must not create parent-child cycles.
//! - Titles are trimmed and must not be blank.

use crate::model::node::{build_tree, Node, NodeId, TreeItem, ROOT_NODE_ID, TOP_LEVEL_PARENT_ID};
use crate::repo::node_repo::{NodeRepository, RepoError};
use log::info;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Operations the root node is protected against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootOperation {
    Delete,
    Move,
}

impl Display for RootOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "deleted"),
            Self::Move => write!(f, "moved"),
        }
    }
}

/// Errors from node tree service operations.
#[derive(Debug)]
pub enum TreeServiceError {
    /// Title is blank after trim.
    InvalidTitle,
    /// Operation is not allowed on the root node.
    RootProtected(RootOperation),
    /// Target node does not exist.
    NodeNotFound(NodeId),
    /// Parent node does not exist.
    ParentNotFound(NodeId),
    /// Move would make a node its own ancestor.
    CycleDetected { node_id: NodeId, parent_id: NodeId },
    /// Parent's children already reach the largest ordering value.
    OrderingExhausted(NodeId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl TreeServiceError {
    /// Returns whether the caller sent an operation that can never succeed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidTitle
                | Self::RootProtected(_)
                | Self::CycleDetected { .. }
                | Self::OrderingExhausted(_)
        )
    }

    /// Returns whether the operation targeted a missing node.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NodeNotFound(_) | Self::ParentNotFound(_))
    }
}

impl Display for TreeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "title must not be blank"),
            Self::RootProtected(operation) => write!(f, "root node cannot be {operation}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent node not found: {id}"),
            Self::CycleDetected { node_id, parent_id } => write!(
                f,
                "invalid move: node {node_id} cannot be placed under {parent_id}"
            ),
            Self::OrderingExhausted(parent_id) => write!(
                f,
                "children of {parent_id} already use the largest ordering value; reorder them first"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TreeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NodeNotFound(id) => Self::NodeNotFound(id),
            RepoError::OrderingExhausted(parent_id) => Self::OrderingExhausted(parent_id),
            other => Self::Repo(other),
        }
    }
}

pub type TreeServiceResult<T> = Result<T, TreeServiceError>;

/// Node tree service facade.
pub struct TreeService<R: NodeRepository> {
    repo: R,
}

impl<R: NodeRepository> TreeService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists children of `parent_id`, or of the top-level sentinel when `None`.
    pub fn list_children(&self, parent_id: Option<NodeId>) -> TreeServiceResult<Vec<Node>> {
        self.repo
            .list_children(parent_id.unwrap_or(TOP_LEVEL_PARENT_ID))
            .map_err(Into::into)
    }

    /// Loads one node.
    pub fn get_node(&self, id: NodeId) -> TreeServiceResult<Option<Node>> {
        self.repo.get_node(id).map_err(Into::into)
    }

    /// Lists every stored node as a flat list.
    pub fn list_all(&self) -> TreeServiceResult<Vec<Node>> {
        self.repo.list_all().map_err(Into::into)
    }

    /// Loads the whole tree nested under the root node.
    pub fn load_tree(&self) -> TreeServiceResult<TreeItem> {
        let nodes = self.repo.list_all()?;
        build_tree(nodes, ROOT_NODE_ID).ok_or(TreeServiceError::NodeNotFound(ROOT_NODE_ID))
    }

    /// Creates one node at the end of `parent_id`'s children.
    pub fn create_node(
        &self,
        parent_id: NodeId,
        title: impl Into<String>,
    ) -> TreeServiceResult<Node> {
        let normalized = normalize_title(title.into())?;
        self.ensure_parent_exists(parent_id)?;

        let node = self.repo.create_node(parent_id, normalized.as_str())?;
        info!(
            "event=tree_create module=service status=ok node_id={} parent_id={} ordering={}",
            node.id, node.parent_id, node.ordering
        );
        Ok(node)
    }

    /// Renames one node.
    pub fn rename_node(&self, id: NodeId, title: impl Into<String>) -> TreeServiceResult<()> {
        let normalized = normalize_title(title.into())?;
        self.repo.rename_node(id, normalized.as_str())?;
        info!("event=tree_rename module=service status=ok node_id={id}");
        Ok(())
    }

    /// Deletes one node with its whole subtree. Returns removed node count.
    pub fn delete_node(&self, id: NodeId) -> TreeServiceResult<usize> {
        if id == ROOT_NODE_ID {
            return Err(TreeServiceError::RootProtected(RootOperation::Delete));
        }

        let removed = self.repo.delete_subtree(id)?;
        info!("event=tree_delete module=service status=ok node_id={id} removed={removed}");
        Ok(removed)
    }

    /// Moves one node to the end of `new_parent_id`'s children.
    pub fn move_node(&self, id: NodeId, new_parent_id: NodeId) -> TreeServiceResult<Node> {
        if id == ROOT_NODE_ID {
            return Err(TreeServiceError::RootProtected(RootOperation::Move));
        }
        if new_parent_id == id {
            return Err(TreeServiceError::CycleDetected {
                node_id: id,
                parent_id: new_parent_id,
            });
        }

        self.repo
            .get_node(id)?
            .ok_or(TreeServiceError::NodeNotFound(id))?;
        self.ensure_parent_exists(new_parent_id)?;
        if self.would_create_cycle(id, new_parent_id)? {
            return Err(TreeServiceError::CycleDetected {
                node_id: id,
                parent_id: new_parent_id,
            });
        }

        let node = self.repo.move_node(id, new_parent_id)?;
        info!(
            "event=tree_move module=service status=ok node_id={id} parent_id={new_parent_id} ordering={}",
            node.ordering
        );
        Ok(node)
    }

    /// Sets the sibling ordering value of one node as given.
    ///
    /// Siblings are not renumbered; equal values fall back to id order.
    pub fn reorder_node(&self, id: NodeId, new_order: i64) -> TreeServiceResult<()> {
        self.repo.set_ordering(id, new_order)?;
        info!("event=tree_reorder module=service status=ok node_id={id} ordering={new_order}");
        Ok(())
    }

    fn ensure_parent_exists(&self, parent_id: NodeId) -> TreeServiceResult<()> {
        self.repo
            .get_node(parent_id)?
            .ok_or(TreeServiceError::ParentNotFound(parent_id))?;
        Ok(())
    }

    /// Walks the ancestor chain of `candidate_parent_id` up to the top level.
    fn would_create_cycle(
        &self,
        node_id: NodeId,
        candidate_parent_id: NodeId,
    ) -> TreeServiceResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = candidate_parent_id;
        while cursor != TOP_LEVEL_PARENT_ID {
            if cursor == node_id || !visited.insert(cursor) {
                return Ok(true);
            }

            cursor = match self.repo.get_node(cursor)? {
                Some(node) => node.parent_id,
                // Dangling chain ends here; it cannot pass through `node_id`.
                None => return Ok(false),
            };
        }
        Ok(false)
    }
}

fn normalize_title(value: String) -> TreeServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TreeServiceError::InvalidTitle);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_title;

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Alpha ".to_string()).unwrap(), "Alpha");
        assert!(normalize_title(" \t ".to_string()).is_err());
    }
}
