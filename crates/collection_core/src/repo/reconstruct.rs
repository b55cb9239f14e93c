//! Type-tag dispatch from raw rows to domain objects.
//!
//! # Invariants
//! - An unregistered tag is an error, never a skipped row.
//! - Batch reconstruction is all-or-nothing.

use crate::model::collection::{
    CollectionRecord, RecordCollection, StaticRecordCollection, TYPE_STATIC,
};
use crate::repo::collection_repo::{RepoError, RepoResult};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Builds one domain object from a row whose tag matched the registration.
pub type CollectionConstructor = fn(&CollectionRecord) -> RepoResult<Box<dyn RecordCollection>>;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidTypeTag(String),
    DuplicateTypeTag(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTypeTag(value) => write!(f, "collection type tag is invalid: `{value}`"),
            Self::DuplicateTypeTag(value) => {
                write!(f, "collection type tag already registered: `{value}`")
            }
        }
    }
}

impl Error for RegistryError {}

/// Maps collection type tags to their constructors.
#[derive(Clone)]
pub struct ReconstructionRegistry {
    constructors: BTreeMap<String, CollectionConstructor>,
}

impl ReconstructionRegistry {
    /// Creates a registry with no types. Every row fails to reconstruct until
    /// something is registered.
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Creates a registry with the `static` variant registered.
    pub fn with_builtin_types() -> Self {
        let mut constructors: BTreeMap<String, CollectionConstructor> = BTreeMap::new();
        constructors.insert(TYPE_STATIC.to_string(), construct_static);
        Self { constructors }
    }

    /// Registers a constructor for `type_tag`.
    pub fn register(
        &mut self,
        type_tag: &str,
        constructor: CollectionConstructor,
    ) -> Result<(), RegistryError> {
        if type_tag.trim().is_empty() || type_tag.trim() != type_tag {
            return Err(RegistryError::InvalidTypeTag(type_tag.to_string()));
        }
        if self.constructors.contains_key(type_tag) {
            return Err(RegistryError::DuplicateTypeTag(type_tag.to_string()));
        }

        self.constructors.insert(type_tag.to_string(), constructor);
        Ok(())
    }

    pub fn is_registered(&self, type_tag: &str) -> bool {
        self.constructors.contains_key(type_tag)
    }

    /// Returns sorted registered tags.
    pub fn registered_types(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    /// Reconstructs one row.
    pub fn reconstruct(&self, record: &CollectionRecord) -> RepoResult<Box<dyn RecordCollection>> {
        let constructor = self
            .constructors
            .get(record.type_tag.as_str())
            .ok_or_else(|| RepoError::UnknownCollectionType {
                id: record.id,
                type_tag: record.type_tag.clone(),
            })?;
        constructor(record)
    }

    /// Reconstructs every row, aborting on the first failure.
    pub fn reconstruct_all(
        &self,
        records: &[CollectionRecord],
    ) -> RepoResult<Vec<Box<dyn RecordCollection>>> {
        records
            .iter()
            .map(|record| self.reconstruct(record))
            .collect()
    }
}

impl Default for ReconstructionRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl std::fmt::Debug for ReconstructionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconstructionRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

fn construct_static(record: &CollectionRecord) -> RepoResult<Box<dyn RecordCollection>> {
    Ok(Box::new(StaticRecordCollection::from_record(record)))
}

#[cfg(test)]
mod tests {
    use super::{ReconstructionRegistry, RegistryError};
    use crate::model::collection::{
        CollectionRecord, RecordCollection, StaticRecordCollection, TYPE_STATIC,
    };
    use crate::repo::collection_repo::{RepoError, RepoResult};

    fn construct_as_static(record: &CollectionRecord) -> RepoResult<Box<dyn RecordCollection>> {
        Ok(Box::new(StaticRecordCollection::from_record(record)))
    }

    #[test]
    fn builtin_registry_knows_static_only() {
        let registry = ReconstructionRegistry::default();
        assert_eq!(registry.registered_types(), vec![TYPE_STATIC.to_string()]);

        let collection = registry
            .reconstruct(&CollectionRecord::new(4, TYPE_STATIC, "pages"))
            .unwrap();
        assert_eq!(collection.id(), 4);
        assert!(collection
            .downcast_ref::<StaticRecordCollection>()
            .is_some());
    }

    #[test]
    fn unknown_tag_fails_with_row_identity() {
        let registry = ReconstructionRegistry::default();
        let err = registry
            .reconstruct(&CollectionRecord::new(9, "filter", "pages"))
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnknownCollectionType { id: 9, ref type_tag } if type_tag == "filter"
        ));
    }

    #[test]
    fn reconstruct_all_aborts_whole_batch_on_unknown_tag() {
        let registry = ReconstructionRegistry::default();
        let records = vec![
            CollectionRecord::new(1, TYPE_STATIC, "pages"),
            CollectionRecord::new(2, "folder", "pages"),
            CollectionRecord::new(3, TYPE_STATIC, "pages"),
        ];

        let err = registry.reconstruct_all(&records).unwrap_err();
        assert!(matches!(err, RepoError::UnknownCollectionType { id: 2, .. }));
    }

    #[test]
    fn register_adds_variant_and_rejects_bad_or_duplicate_tags() {
        let mut registry = ReconstructionRegistry::new();
        assert!(registry.registered_types().is_empty());

        registry.register("folder", construct_as_static).unwrap();
        assert!(registry.is_registered("folder"));
        assert!(registry
            .reconstruct(&CollectionRecord::new(1, "folder", "pages"))
            .is_ok());

        assert_eq!(
            registry.register("folder", construct_as_static),
            Err(RegistryError::DuplicateTypeTag("folder".to_string()))
        );
        assert_eq!(
            registry.register(" ", construct_as_static),
            Err(RegistryError::InvalidTypeTag(" ".to_string()))
        );
    }
}
