//! Read-side visibility policy.
//!
//! # Responsibility
//! - Decide whether a call runs in administrative or public context.
//! - Translate a context into the row predicates every read must apply.
//!
//! # Invariants
//! - Soft-deleted rows are excluded in every context.
//! - Core code never consults process-global state to pick a context; the
//!   context always arrives as a value.

pub mod visibility;
