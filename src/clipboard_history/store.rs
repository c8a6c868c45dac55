//! Storage abstraction for clipboard history
//!
//! [`SqliteHistoryStore`](super::database::SqliteHistoryStore) is the
//! production implementation. Every method takes `&self`; implementations
//! serialize writers internally.

use chrono::{DateTime, Utc};

use super::change_detection::Fingerprint;
use super::retention::{CleanupReport, RetentionPlan};
use super::types::{ContentType, EntryId, HistoryEntry, ListQuery, Page, SortOrder};
use crate::error::HistoryResult;

/// What [`HistoryStore::create_or_touch`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted(EntryId),
    /// An entry with the same fingerprint existed; its `last_accessed_at` was refreshed
    Touched(EntryId),
}

pub trait HistoryStore: Send + Sync {
    fn create(&self, entry: &HistoryEntry) -> HistoryResult<()>;

    /// Insert `entry`, or refresh the entry that already has its fingerprint
    /// to `entry.last_accessed_at`. Lookup and write happen as one step.
    fn create_or_touch(&self, entry: &HistoryEntry) -> HistoryResult<Upsert>;

    fn get(&self, id: &EntryId) -> HistoryResult<Option<HistoryEntry>>;

    fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> HistoryResult<Option<HistoryEntry>>;

    /// Returns false when no entry has `id`.
    fn update_last_accessed(&self, id: &EntryId, at: DateTime<Utc>) -> HistoryResult<bool>;

    /// Returns false when no entry has `id`.
    fn set_pinned(&self, id: &EntryId, pinned: bool) -> HistoryResult<bool>;

    /// Returns false when no entry has `id`.
    fn delete(&self, id: &EntryId) -> HistoryResult<bool>;

    fn delete_older_than(&self, cutoff: DateTime<Utc>, exclude_pinned: bool) -> HistoryResult<usize>;

    fn count(&self) -> HistoryResult<usize>;

    fn count_non_pinned(&self) -> HistoryResult<usize>;

    fn delete_oldest_non_pinned(&self, n: usize) -> HistoryResult<usize>;

    fn list_by_recency(&self, query: &ListQuery) -> HistoryResult<Vec<HistoryEntry>>;

    /// Case-insensitive substring match on the preview text
    fn search_by_text(
        &self,
        substring: &str,
        page: Page,
        sort: SortOrder,
    ) -> HistoryResult<Vec<HistoryEntry>>;

    /// Regular expression match on the preview text.
    ///
    /// Fails with `HistoryError::Pattern` when `pattern` does not compile.
    fn search_by_pattern(
        &self,
        pattern: &str,
        page: Page,
        sort: SortOrder,
    ) -> HistoryResult<Vec<HistoryEntry>>;

    fn clear_all(&self, preserve_pinned: bool) -> HistoryResult<usize>;

    fn clear_by_type(&self, content_type: ContentType, preserve_pinned: bool)
        -> HistoryResult<usize>;

    /// Run both retention phases as one unit.
    fn apply_retention(&self, plan: &RetentionPlan) -> HistoryResult<CleanupReport>;
}
