//! Core domain logic for nodetree.
//! This crate is the single source of truth for tree invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::node::{build_tree, Node, NodeId, TreeItem, ROOT_NODE_ID, TOP_LEVEL_PARENT_ID};
pub use repo::node_repo::{NodeRepository, RepoError, RepoResult, SqliteNodeRepository};
pub use service::tree_service::{
    RootOperation, TreeService, TreeServiceError, TreeServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
