//! Repository layer: node tree persistence contract and SQLite implementation.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NodeNotFound`) in addition to DB
//!   transport errors.
//! - Multi-statement writes run inside one immediate transaction.

pub mod node_repo;
