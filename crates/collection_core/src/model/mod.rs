//! Record collection domain model.
//!
//! # Responsibility
//! - Define the raw row shape read from `record_collections`.
//! - Define the typed domain objects rows reconstruct into.
//!
//! # Invariants
//! - Every collection is identified by a stable integer `CollectionId`.
//! - Deletion is represented by the soft-delete flag, never a hard delete.

pub mod collection;
