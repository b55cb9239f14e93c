//! Collection use-case service.
//!
//! # Responsibility
//! - Resolve the visibility context once per call and forward it to the
//!   repository.
//!
//! # Invariants
//! - Service APIs never bypass repository visibility filtering.
//! - Service layer remains storage-agnostic.

use crate::model::collection::{CollectionId, RecordCollection};
use crate::policy::visibility::{ContextResolver, RequestMarkerResolver, VisibilityContext};
use crate::repo::collection_repo::{CollectionRepository, RepoResult};

/// Use-case wrapper pairing a repository with a context resolver.
pub struct CollectionService<R: CollectionRepository, X: ContextResolver = RequestMarkerResolver> {
    repo: R,
    resolver: X,
}

impl<R: CollectionRepository> CollectionService<R, RequestMarkerResolver> {
    /// Creates a service that resolves the administrative context.
    pub fn new(repo: R) -> Self {
        Self::with_resolver(repo, RequestMarkerResolver::default())
    }
}

impl<R: CollectionRepository, X: ContextResolver> CollectionService<R, X> {
    pub fn with_resolver(repo: R, resolver: X) -> Self {
        Self { repo, resolver }
    }

    /// Context the next call will run under.
    pub fn context(&self) -> VisibilityContext {
        self.resolver.resolve()
    }

    pub fn find_by_id(&self, id: CollectionId) -> RepoResult<Option<Box<dyn RecordCollection>>> {
        self.repo.find_by_id(self.context(), id)
    }

    pub fn find_all(&self) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.repo.find_all(self.context())
    }

    pub fn find_by_owning_table(
        &self,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.repo.find_by_owning_table(self.context(), table_name)
    }

    pub fn find_by_type(&self, type_tag: &str) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.repo.find_by_type(self.context(), type_tag)
    }

    pub fn find_by_type_and_owning_table(
        &self,
        type_tag: &str,
        table_name: &str,
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        self.repo
            .find_by_type_and_owning_table(self.context(), type_tag, table_name)
    }

    /// Soft-deletes a collection regardless of context.
    pub fn delete_by_id(&self, id: CollectionId) -> RepoResult<()> {
        self.repo.delete_by_id(id)
    }
}
