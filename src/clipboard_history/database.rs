//! Clipboard history database
//!
//! SQLite-backed [`HistoryStore`]. One connection per store, guarded by a
//! mutex that serializes every read and write.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::change_detection::Fingerprint;
use super::db_impl::*;
use super::retention::{self, CleanupReport, RetentionPlan, RetentionTarget};
use super::store::{HistoryStore, Upsert};
use super::types::{ContentType, EntryId, HistoryEntry, ListQuery, Page, SortOrder};
use crate::error::{HistoryError, HistoryResult};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Directory holding the history database
const DB_DIR: &str = "~/.cliptrail/db";
const DB_FILE_NAME: &str = "clipboard-history.sqlite";

/// Get the database path (~/.cliptrail/db/clipboard-history.sqlite), creating
/// the directory if needed.
pub fn default_db_path() -> HistoryResult<PathBuf> {
    let db_dir = PathBuf::from(shellexpand::tilde(DB_DIR).as_ref());

    if !db_dir.exists() {
        std::fs::create_dir_all(&db_dir).map_err(|source| HistoryError::Io {
            path: db_dir.display().to_string(),
            source,
        })?;
    }

    Ok(db_dir.join(DB_FILE_NAME))
}

pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> HistoryResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Opened clipboard history database");
        Ok(store)
    }

    /// Open the database at the default location.
    pub fn open_default() -> HistoryResult<Self> {
        Self::open(&default_db_path()?)
    }

    /// Private database for tests and throwaway sessions.
    pub fn open_in_memory() -> HistoryResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> HistoryResult<Self> {
        // WAL keeps readers from blocking the poll thread's writes
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        debug!("Enabled WAL mode for clipboard history database");

        // Wait instead of failing with "database is locked" when another
        // process holds the file
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;

        create_schema(&conn)?;
        register_regexp(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn create_schema(conn: &Connection) -> HistoryResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS history (
            id TEXT PRIMARY KEY,
            content TEXT NOT NULL,
            preview TEXT NOT NULL,
            fingerprint TEXT NOT NULL,
            content_type TEXT NOT NULL DEFAULT 'text',
            pinned INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            last_accessed_at INTEGER NOT NULL
        )",
        [],
    )?;

    // At most one entry per fingerprint
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_fingerprint ON history(fingerprint)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pinned_accessed ON history(pinned DESC, last_accessed_at DESC)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_pinned_created ON history(pinned, created_at)",
        [],
    )?;

    Ok(())
}

/// Register `regexp(pattern, text)` so `text REGEXP pattern` works in SQL.
///
/// The compiled pattern is cached per statement through SQLite's auxiliary
/// data, so a search compiles it once rather than once per row.
fn register_regexp(conn: &Connection) -> HistoryResult<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regexp: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let text = ctx
                .get_raw(1)
                .as_str()
                .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
            Ok(regexp.is_match(text))
        },
    )?;
    Ok(())
}

/// Retention primitives bound to one open transaction
struct TransactionTarget<'a> {
    tx: &'a Transaction<'a>,
}

impl RetentionTarget for TransactionTarget<'_> {
    fn delete_older_than(
        &mut self,
        cutoff: DateTime<Utc>,
        exclude_pinned: bool,
    ) -> HistoryResult<usize> {
        prune_impl(self.tx, cutoff, exclude_pinned)
    }

    fn count_non_pinned(&mut self) -> HistoryResult<usize> {
        get_non_pinned_count_impl(self.tx)
    }

    fn delete_oldest_non_pinned(&mut self, n: usize) -> HistoryResult<usize> {
        trim_oldest_impl(self.tx, n)
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn create(&self, entry: &HistoryEntry) -> HistoryResult<()> {
        insert_impl(&self.conn.lock(), entry)
    }

    fn create_or_touch(&self, entry: &HistoryEntry) -> HistoryResult<Upsert> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let outcome = match find_by_fingerprint_impl(&tx, &entry.fingerprint)? {
            Some(existing) => {
                touch_impl(&tx, &existing.id, entry.last_accessed_at)?;
                Upsert::Touched(existing.id)
            }
            None => {
                insert_impl(&tx, entry)?;
                Upsert::Inserted(entry.id.clone())
            }
        };
        tx.commit()?;
        Ok(outcome)
    }

    fn get(&self, id: &EntryId) -> HistoryResult<Option<HistoryEntry>> {
        get_entry_impl(&self.conn.lock(), id)
    }

    fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> HistoryResult<Option<HistoryEntry>> {
        find_by_fingerprint_impl(&self.conn.lock(), fingerprint)
    }

    fn update_last_accessed(&self, id: &EntryId, at: DateTime<Utc>) -> HistoryResult<bool> {
        touch_impl(&self.conn.lock(), id, at)
    }

    fn set_pinned(&self, id: &EntryId, pinned: bool) -> HistoryResult<bool> {
        set_pinned_impl(&self.conn.lock(), id, pinned)
    }

    fn delete(&self, id: &EntryId) -> HistoryResult<bool> {
        remove_impl(&self.conn.lock(), id)
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>, exclude_pinned: bool) -> HistoryResult<usize> {
        prune_impl(&self.conn.lock(), cutoff, exclude_pinned)
    }

    fn count(&self) -> HistoryResult<usize> {
        get_count_impl(&self.conn.lock())
    }

    fn count_non_pinned(&self) -> HistoryResult<usize> {
        get_non_pinned_count_impl(&self.conn.lock())
    }

    fn delete_oldest_non_pinned(&self, n: usize) -> HistoryResult<usize> {
        trim_oldest_impl(&self.conn.lock(), n)
    }

    fn list_by_recency(&self, query: &ListQuery) -> HistoryResult<Vec<HistoryEntry>> {
        let entries = get_page_impl(&self.conn.lock(), query)?;
        debug!(
            count = entries.len(),
            limit = query.page.limit,
            offset = query.page.offset,
            "Retrieved clipboard history page"
        );
        Ok(entries)
    }

    fn search_by_text(
        &self,
        substring: &str,
        page: Page,
        sort: SortOrder,
    ) -> HistoryResult<Vec<HistoryEntry>> {
        search_text_impl(&self.conn.lock(), substring, page, sort)
    }

    fn search_by_pattern(
        &self,
        pattern: &str,
        page: Page,
        sort: SortOrder,
    ) -> HistoryResult<Vec<HistoryEntry>> {
        // Compile up front so a bad pattern surfaces as Pattern, not Storage
        Regex::new(pattern)?;
        search_regex_impl(&self.conn.lock(), pattern, page, sort)
    }

    fn clear_all(&self, preserve_pinned: bool) -> HistoryResult<usize> {
        let deleted = clear_impl(&self.conn.lock(), preserve_pinned)?;
        info!(deleted, preserve_pinned, "Cleared clipboard history");
        Ok(deleted)
    }

    fn clear_by_type(
        &self,
        content_type: ContentType,
        preserve_pinned: bool,
    ) -> HistoryResult<usize> {
        let deleted = clear_type_impl(&self.conn.lock(), content_type, preserve_pinned)?;
        info!(
            deleted,
            content_type = content_type.as_str(),
            preserve_pinned,
            "Cleared clipboard history by type"
        );
        Ok(deleted)
    }

    fn apply_retention(&self, plan: &RetentionPlan) -> HistoryResult<CleanupReport> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let report = retention::apply(&mut TransactionTarget { tx: &tx }, plan)?;
        tx.commit()?;
        Ok(report)
    }
}
