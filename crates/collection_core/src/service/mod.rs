//! Core use-case services.
//!
//! # Responsibility
//! - Resolve the caller's visibility context at the application boundary.
//! - Keep CLI and other front layers decoupled from storage details.

pub mod collection_service;
