//! Clipboard History Module
//!
//! SQLite-backed clipboard history with background monitoring.
//!
//! ## Features
//! - Skips blank, oversized and password-like content
//! - Classifies entries as text, image reference or file reference
//! - De-duplicates by SHA-256 fingerprint; re-copying refreshes recency
//! - Count and age retention that never touches pinned entries
//! - Substring and regular expression search over previews
//!
//! ## Module Structure
//! - `types`: Core types (ContentType, EntryId, HistoryEntry, SortOrder)
//! - `classifier`: Skip rules, password heuristics, content type, previews
//! - `change_detection`: Fingerprints and the last-seen detector
//! - `retention`: Two-phase eviction policy
//! - `store`: `HistoryStore` trait
//! - `database`: SQLite implementation of the store
//! - `recorder`: Classify, de-duplicate and persist one snapshot
//! - `monitor`: Background polling and cleanup threads
//! - `clipboard`: Clipboard reader/writer ports
//! - `history`: `ClipboardHistory`, the facade used by callers

mod change_detection;
mod classifier;
mod clipboard;
mod database;
mod db_impl;
mod history;
mod monitor;
mod recorder;
mod retention;
mod store;
mod types;

// Types
pub use types::{ContentType, EntryId, HistoryEntry, ListQuery, Page, SortOrder};

// Classification
pub use classifier::{
    classify, decide_password, detect_content_type, is_image_format, looks_like_password,
    should_skip, skip_reason, truncate_preview, Classification, PasswordDecision, PasswordRule,
    SkipReason, Verdict, DEFAULT_PREVIEW_LENGTH, IMAGE_EXTENSIONS, MAX_CONTENT_BYTES,
    PASSWORD_RULES,
};

// Change detection
pub use change_detection::{fingerprint, has_changed, ClipboardChangeDetector, Fingerprint};

// Retention
pub use retention::{apply as apply_plan, CleanupReport, RetentionPlan, RetentionTarget};

// Storage
pub use database::{default_db_path, SqliteHistoryStore};
pub use store::{HistoryStore, Upsert};

// Recording and monitoring
pub use monitor::{ClipboardMonitor, ShutdownSignal, TickOutcome};
pub use recorder::{RecordOutcome, Recorder};

// Clipboard ports
pub use clipboard::{ClipboardReader, ClipboardWriter, MemoryClipboard};

// Facade
pub use history::ClipboardHistory;
