//! Core clipboard history types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::change_detection::Fingerprint;
use super::classifier::truncate_preview;

/// Content types for clipboard entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    /// Textual reference to an image (path or URL); image bytes are never stored
    Image,
    /// Textual reference to a file on disk
    File,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::File => "file",
        }
    }

    /// Lenient parse used for rows read back from storage; unknown values map to text.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "image" => ContentType::Image,
            "file" => ContentType::File,
            _ => ContentType::Text,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "file" => Ok(ContentType::File),
            other => Err(format!("unknown content type '{}'", other)),
        }
    }
}

/// Opaque, process-wide unique entry identifier (UUID v4)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        EntryId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        EntryId(value)
    }
}

/// One retained clipboard event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: EntryId,
    pub content_type: ContentType,
    pub content: String,
    /// Bounded-length preview derived from `content` at creation
    pub preview: String,
    #[serde(skip)]
    pub fingerprint: Fingerprint,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    /// Recency key, refreshed on duplicate re-copy and explicit recall
    pub last_accessed_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build a fresh, unpinned entry.
    ///
    /// Timestamps are truncated to milliseconds, the precision storage keeps.
    pub fn new(
        content: String,
        content_type: ContentType,
        fingerprint: Fingerprint,
        preview_length: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let now = now.trunc_subsecs(3);
        HistoryEntry {
            id: EntryId::generate(),
            content_type,
            preview: truncate_preview(&content, preview_length),
            content,
            fingerprint,
            pinned: false,
            created_at: now,
            last_accessed_at: now,
        }
    }
}

/// Secondary ordering applied after pinned entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    /// Most recently copied or recalled first
    #[default]
    LastAccessed,
    /// Most recently created first
    Created,
}

impl SortOrder {
    pub(crate) fn order_by_clause(&self) -> &'static str {
        match self {
            SortOrder::LastAccessed => "pinned DESC, last_accessed_at DESC, id DESC",
            SortOrder::Created => "pinned DESC, created_at DESC, id DESC",
        }
    }
}

/// Limit/offset pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Page { limit, offset }
    }

    pub fn first(limit: usize) -> Self {
        Page { limit, offset: 0 }
    }
}

/// Parameters for a recency listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Page,
    /// Restrict to one content type
    pub content_type: Option<ContentType>,
    pub sort: SortOrder,
}

impl ListQuery {
    pub fn recent(limit: usize) -> Self {
        ListQuery {
            page: Page::first(limit),
            content_type: None,
            sort: SortOrder::LastAccessed,
        }
    }
}
