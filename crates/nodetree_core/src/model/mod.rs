//! Domain model for the node tree.
//!
//! # Invariants
//! - Exactly one root node exists, with id [`node::ROOT_NODE_ID`].
//! - Every other node's parent chain terminates at the root.

pub mod node;
