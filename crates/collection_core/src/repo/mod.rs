//! Repository layer for record collections.
//!
//! # Responsibility
//! - Build visibility-filtered reads over `record_collections`.
//! - Reconstruct rows into typed domain objects by type tag.
//!
//! # Invariants
//! - Every read applies the visibility filter of the caller's context.
//! - Absence is a value (`None` / empty `Vec`), never an error.

pub mod collection_repo;
pub mod reconstruct;
