//! Visibility context resolution and predicate sets.

use crate::model::collection::CollectionRecord;
use rusqlite::types::Value;

/// Caller trust level for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityContext {
    /// Trusted back-office caller. Only soft-deleted rows are filtered.
    #[default]
    Administrative,
    /// Untrusted public-facing request. Hidden and out-of-window rows are
    /// filtered too.
    Public,
}

impl VisibilityContext {
    /// Stable identifier used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Administrative => "administrative",
            Self::Public => "public",
        }
    }
}

/// Decides the context for one invocation.
pub trait ContextResolver {
    fn resolve(&self) -> VisibilityContext;
}

/// Marker handed over by the request boundary when it is serving a live
/// public-facing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontendRequest;

/// Resolves `Public` iff a front-end request marker was supplied.
///
/// The default instance carries no marker and therefore resolves
/// `Administrative`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestMarkerResolver {
    marker: Option<FrontendRequest>,
}

impl RequestMarkerResolver {
    pub fn new(marker: Option<FrontendRequest>) -> Self {
        Self { marker }
    }

    pub fn frontend() -> Self {
        Self::new(Some(FrontendRequest))
    }
}

impl ContextResolver for RequestMarkerResolver {
    fn resolve(&self) -> VisibilityContext {
        match self.marker {
            Some(FrontendRequest) => VisibilityContext::Public,
            None => VisibilityContext::Administrative,
        }
    }
}

/// Always resolves the configured context.
#[derive(Debug, Clone, Copy)]
pub struct FixedContextResolver(pub VisibilityContext);

impl ContextResolver for FixedContextResolver {
    fn resolve(&self) -> VisibilityContext {
        self.0
    }
}

/// One row-level condition of a visibility filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityPredicate {
    NotDeleted,
    NotHidden,
    /// `visible_from` is unset or not after the given instant.
    StartedBy(i64),
    /// `visible_until` is unset or after the given instant.
    NotEndedBy(i64),
}

impl VisibilityPredicate {
    fn sql(self) -> &'static str {
        match self {
            // Flags other than 0/1 must reach row decoding, which rejects them.
            Self::NotDeleted => "deleted <> 1",
            Self::NotHidden => "hidden <> 1",
            Self::StartedBy(_) => "visible_from <= ?",
            Self::NotEndedBy(_) => "(visible_until = 0 OR visible_until > ?)",
        }
    }

    fn bind_value(self) -> Option<Value> {
        match self {
            Self::NotDeleted | Self::NotHidden => None,
            Self::StartedBy(now) | Self::NotEndedBy(now) => Some(Value::Integer(now)),
        }
    }

    /// Evaluates the predicate against an already loaded row.
    pub fn admits(self, record: &CollectionRecord) -> bool {
        match self {
            Self::NotDeleted => !record.deleted,
            Self::NotHidden => !record.hidden,
            Self::StartedBy(now) => record.visible_from <= now,
            Self::NotEndedBy(now) => record.visible_until == 0 || record.visible_until > now,
        }
    }
}

/// Conjunction of predicates applied to every read in one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityFilter {
    predicates: Vec<VisibilityPredicate>,
}

impl VisibilityFilter {
    pub fn predicates(&self) -> &[VisibilityPredicate] {
        &self.predicates
    }

    /// Appends ` AND <predicate>` for each predicate and collects the
    /// positional values they bind.
    pub fn append_sql(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        for predicate in &self.predicates {
            sql.push_str(" AND ");
            sql.push_str(predicate.sql());
            if let Some(value) = predicate.bind_value() {
                bind_values.push(value);
            }
        }
    }

    pub fn admits(&self, record: &CollectionRecord) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.admits(record))
    }
}

/// Builds the predicate set for `context`, evaluated at `now` (unix seconds).
pub fn filters_for(context: VisibilityContext, now: i64) -> VisibilityFilter {
    let predicates = match context {
        VisibilityContext::Administrative => vec![VisibilityPredicate::NotDeleted],
        VisibilityContext::Public => vec![
            VisibilityPredicate::NotDeleted,
            VisibilityPredicate::NotHidden,
            VisibilityPredicate::StartedBy(now),
            VisibilityPredicate::NotEndedBy(now),
        ],
    };

    VisibilityFilter { predicates }
}

#[cfg(test)]
mod tests {
    use super::{
        filters_for, ContextResolver, FixedContextResolver, RequestMarkerResolver,
        VisibilityContext, VisibilityPredicate,
    };
    use crate::model::collection::{CollectionRecord, TYPE_STATIC};
    use rusqlite::types::Value;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn resolver_without_marker_is_administrative() {
        assert_eq!(
            RequestMarkerResolver::default().resolve(),
            VisibilityContext::Administrative
        );
        assert_eq!(
            RequestMarkerResolver::frontend().resolve(),
            VisibilityContext::Public
        );
        assert_eq!(
            FixedContextResolver(VisibilityContext::Public).resolve(),
            VisibilityContext::Public
        );
    }

    #[test]
    fn administrative_filter_only_excludes_deleted() {
        let filter = filters_for(VisibilityContext::Administrative, NOW);
        assert_eq!(filter.predicates(), &[VisibilityPredicate::NotDeleted]);

        let mut record = CollectionRecord::new(1, TYPE_STATIC, "pages");
        record.hidden = true;
        record.visible_from = NOW + 99_999;
        record.visible_until = NOW - 99_999;
        assert!(filter.admits(&record));

        record.deleted = true;
        assert!(!filter.admits(&record));
    }

    #[test]
    fn public_filter_excludes_hidden_and_out_of_window_rows() {
        let filter = filters_for(VisibilityContext::Public, NOW);
        let visible = CollectionRecord::new(1, TYPE_STATIC, "pages");
        assert!(filter.admits(&visible));

        let mut hidden = visible.clone();
        hidden.hidden = true;
        assert!(!filter.admits(&hidden));

        let mut future = visible.clone();
        future.visible_from = NOW + 99_999;
        assert!(!filter.admits(&future));

        let mut expired = visible.clone();
        expired.visible_until = NOW - 99_999;
        assert!(!filter.admits(&expired));

        let mut open_window = visible;
        open_window.visible_from = NOW - 10;
        open_window.visible_until = NOW + 10;
        assert!(filter.admits(&open_window));
    }

    #[test]
    fn append_sql_renders_conjunction_with_bound_instants() {
        let mut sql = String::from("SELECT id FROM record_collections WHERE 1 = 1");
        let mut binds = Vec::new();
        filters_for(VisibilityContext::Public, NOW).append_sql(&mut sql, &mut binds);

        assert!(sql.ends_with(
            " AND deleted <> 1 AND hidden <> 1 AND visible_from <= ? \
             AND (visible_until = 0 OR visible_until > ?)"
        ));
        assert_eq!(binds, vec![Value::Integer(NOW), Value::Integer(NOW)]);
    }
}
