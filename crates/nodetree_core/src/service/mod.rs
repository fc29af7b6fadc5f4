//! Core use-case services.
//!
//! # Responsibility
//! - Validate tree invariants above the repository layer.
//! - Keep the HTTP layer decoupled from storage details.

pub mod tree_service;
