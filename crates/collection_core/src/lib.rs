//! Read-side data access for record collections.
//! This crate owns the visibility rules and the row-to-object reconstruction
//! policy for the `record_collections` table.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::collection::{
    CollectionId, CollectionRecord, RecordCollection, StaticRecordCollection, TYPE_STATIC,
};
pub use policy::visibility::{
    filters_for, ContextResolver, FixedContextResolver, FrontendRequest, RequestMarkerResolver,
    VisibilityContext, VisibilityFilter, VisibilityPredicate,
};
pub use repo::collection_repo::{
    CollectionRepository, RepoError, RepoResult, SqliteCollectionRepository,
};
pub use repo::reconstruct::{CollectionConstructor, ReconstructionRegistry, RegistryError};
pub use service::collection_service::CollectionService;

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
