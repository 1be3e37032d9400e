//! Domain Layer - Core matching types and business logic.
//!
//! This layer contains the catalog matcher and response assembly
//! with no transport dependencies.

/// Catalog of known item names and substring matching.
pub mod catalog;

/// Order match assembly (matched entry + timestamp).
pub mod order;
