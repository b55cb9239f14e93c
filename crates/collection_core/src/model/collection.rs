//! Collection row and domain object definitions.
//!
//! # Responsibility
//! - Carry a persisted row verbatim into reconstruction.
//! - Expose the polymorphic domain object contract shared by all variants.
//!
//! # Invariants
//! - `CollectionRecord::type_tag` selects the variant; it is never rewritten.
//! - Domain objects are read-only snapshots; mutation happens outside this
//!   crate.

use serde::Serialize;
use std::any::Any;
use std::fmt::Debug;

/// Primary key of a `record_collections` row.
pub type CollectionId = i64;

/// Type tag of the static collection variant.
pub const TYPE_STATIC: &str = "static";

/// One `record_collections` row as stored.
///
/// Flags are already decoded to `bool`; timestamps are unix seconds where
/// `0` means unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRecord {
    pub id: CollectionId,
    pub type_tag: String,
    pub owning_table: String,
    pub deleted: bool,
    pub modified_at: i64,
    pub created_at: i64,
    pub hidden: bool,
    pub visible_from: i64,
    pub visible_until: i64,
    pub title: String,
    pub description: String,
    pub language_id: i64,
    pub item_count: i64,
}

impl CollectionRecord {
    /// Creates a visible, non-deleted record with empty payload.
    pub fn new(
        id: CollectionId,
        type_tag: impl Into<String>,
        owning_table: impl Into<String>,
    ) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
            owning_table: owning_table.into(),
            deleted: false,
            modified_at: 0,
            created_at: 0,
            hidden: false,
            visible_from: 0,
            visible_until: 0,
            title: String::new(),
            description: String::new(),
            language_id: 0,
            item_count: 0,
        }
    }
}

/// Typed view over a reconstructed collection row.
///
/// Implemented once per registered type tag. Callers that need
/// variant-specific fields downcast through `as_any`.
pub trait RecordCollection: Debug + Send + Sync {
    fn id(&self) -> CollectionId;
    fn type_tag(&self) -> &str;
    fn owning_table(&self) -> &str;
    fn title(&self) -> &str;
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn RecordCollection + 'a {
    /// Returns the concrete variant when it is `T`.
    pub fn downcast_ref<T: RecordCollection + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Collection whose members are an explicit, curated list of rows in
/// `owning_table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRecordCollection {
    pub id: CollectionId,
    pub owning_table: String,
    pub title: String,
    pub description: String,
    pub language_id: i64,
    /// Number of member rows referenced by this collection.
    pub item_count: i64,
    pub hidden: bool,
    pub visible_from: Option<i64>,
    pub visible_until: Option<i64>,
    pub created_at: i64,
    pub modified_at: i64,
}

impl StaticRecordCollection {
    /// Builds the domain object from a full row.
    ///
    /// The caller is responsible for having matched `record.type_tag`.
    pub fn from_record(record: &CollectionRecord) -> Self {
        Self {
            id: record.id,
            owning_table: record.owning_table.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            language_id: record.language_id,
            item_count: record.item_count,
            hidden: record.hidden,
            visible_from: non_zero(record.visible_from),
            visible_until: non_zero(record.visible_until),
            created_at: record.created_at,
            modified_at: record.modified_at,
        }
    }
}

impl RecordCollection for StaticRecordCollection {
    fn id(&self) -> CollectionId {
        self.id
    }

    fn type_tag(&self) -> &str {
        TYPE_STATIC
    }

    fn owning_table(&self) -> &str {
        &self.owning_table
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn non_zero(value: i64) -> Option<i64> {
    (value != 0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::{CollectionRecord, RecordCollection, StaticRecordCollection, TYPE_STATIC};

    #[test]
    fn static_collection_copies_payload_and_maps_unset_window_to_none() {
        let mut record = CollectionRecord::new(7, TYPE_STATIC, "tx_news");
        record.title = "Featured".to_string();
        record.item_count = 3;
        record.visible_until = 1_800_000_000;

        let collection = StaticRecordCollection::from_record(&record);

        assert_eq!(collection.id, 7);
        assert_eq!(collection.owning_table, "tx_news");
        assert_eq!(collection.title, "Featured");
        assert_eq!(collection.item_count, 3);
        assert_eq!(collection.visible_from, None);
        assert_eq!(collection.visible_until, Some(1_800_000_000));
    }

    #[test]
    fn trait_object_downcasts_to_static_variant() {
        let record = CollectionRecord::new(1, TYPE_STATIC, "pages");
        let boxed: Box<dyn RecordCollection> =
            Box::new(StaticRecordCollection::from_record(&record));

        assert_eq!(boxed.type_tag(), TYPE_STATIC);
        assert!(boxed.downcast_ref::<StaticRecordCollection>().is_some());
    }
}
