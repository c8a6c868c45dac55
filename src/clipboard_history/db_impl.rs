//! SQL for the clipboard history table
//!
//! Free functions over a borrowed `Connection` so the same statements run on
//! a plain connection or inside a `Transaction`.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::change_detection::Fingerprint;
use super::types::{ContentType, EntryId, HistoryEntry, ListQuery, Page, SortOrder};
use crate::error::HistoryResult;

pub(crate) const ENTRY_COLUMNS: &str =
    "id, content, preview, fingerprint, content_type, pinned, created_at, last_accessed_at";

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let fingerprint = row
        .get::<_, String>(3)?
        .parse::<Fingerprint>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(HistoryEntry {
        id: EntryId::from(row.get::<_, String>(0)?),
        content: row.get(1)?,
        preview: row.get(2)?,
        fingerprint,
        content_type: ContentType::from_str_lossy(&row.get::<_, String>(4)?),
        pinned: row.get::<_, i64>(5)? != 0,
        created_at: from_millis(row.get(6)?),
        last_accessed_at: from_millis(row.get(7)?),
    })
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'` clause
pub(crate) fn like_pattern(substring: &str) -> String {
    let mut escaped = String::with_capacity(substring.len() + 2);
    escaped.push('%');
    for c in substring.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub fn insert_impl(conn: &Connection, entry: &HistoryEntry) -> HistoryResult<()> {
    conn.execute(
        "INSERT INTO history (id, content, preview, fingerprint, content_type, pinned, created_at, last_accessed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.as_str(),
            &entry.content,
            &entry.preview,
            entry.fingerprint.to_hex(),
            entry.content_type.as_str(),
            entry.pinned,
            to_millis(entry.created_at),
            to_millis(entry.last_accessed_at),
        ],
    )?;

    debug!(id = %entry.id, content_type = entry.content_type.as_str(), "Inserted clipboard entry");
    Ok(())
}

pub fn get_entry_impl(conn: &Connection, id: &EntryId) -> HistoryResult<Option<HistoryEntry>> {
    let sql = format!("SELECT {} FROM history WHERE id = ?1", ENTRY_COLUMNS);
    Ok(conn
        .query_row(&sql, params![id.as_str()], row_to_entry)
        .optional()?)
}

pub fn find_by_fingerprint_impl(
    conn: &Connection,
    fingerprint: &Fingerprint,
) -> HistoryResult<Option<HistoryEntry>> {
    let sql = format!("SELECT {} FROM history WHERE fingerprint = ?1", ENTRY_COLUMNS);
    Ok(conn
        .query_row(&sql, params![fingerprint.to_hex()], row_to_entry)
        .optional()?)
}

pub fn touch_impl(conn: &Connection, id: &EntryId, at: DateTime<Utc>) -> HistoryResult<bool> {
    let updated = conn.execute(
        "UPDATE history SET last_accessed_at = ?1 WHERE id = ?2",
        params![to_millis(at), id.as_str()],
    )?;
    Ok(updated > 0)
}

pub fn set_pinned_impl(conn: &Connection, id: &EntryId, pinned: bool) -> HistoryResult<bool> {
    let updated = conn.execute(
        "UPDATE history SET pinned = ?1 WHERE id = ?2",
        params![pinned, id.as_str()],
    )?;
    debug!(id = %id, pinned, "Set pin status");
    Ok(updated > 0)
}

pub fn remove_impl(conn: &Connection, id: &EntryId) -> HistoryResult<bool> {
    let deleted = conn.execute("DELETE FROM history WHERE id = ?1", params![id.as_str()])?;
    debug!(id = %id, deleted, "Removed clipboard entry");
    Ok(deleted > 0)
}

pub fn prune_impl(
    conn: &Connection,
    cutoff: DateTime<Utc>,
    exclude_pinned: bool,
) -> HistoryResult<usize> {
    let sql = if exclude_pinned {
        "DELETE FROM history WHERE pinned = 0 AND created_at < ?1"
    } else {
        "DELETE FROM history WHERE created_at < ?1"
    };
    Ok(conn.execute(sql, params![to_millis(cutoff)])?)
}

pub fn get_count_impl(conn: &Connection) -> HistoryResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
    Ok(count as usize)
}

pub fn get_non_pinned_count_impl(conn: &Connection) -> HistoryResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM history WHERE pinned = 0",
        [],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

pub fn trim_oldest_impl(conn: &Connection, n: usize) -> HistoryResult<usize> {
    if n == 0 {
        return Ok(0);
    }
    Ok(conn.execute(
        "DELETE FROM history WHERE id IN (
            SELECT id FROM history WHERE pinned = 0
            ORDER BY created_at ASC, id ASC
            LIMIT ?1
         )",
        params![n],
    )?)
}

pub fn get_page_impl(conn: &Connection, query: &ListQuery) -> HistoryResult<Vec<HistoryEntry>> {
    let sql = format!(
        "SELECT {} FROM history
         WHERE (?1 IS NULL OR content_type = ?1)
         ORDER BY {} LIMIT ?2 OFFSET ?3",
        ENTRY_COLUMNS,
        query.sort.order_by_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(
            params![
                query.content_type.map(|t| t.as_str()),
                query.page.limit,
                query.page.offset
            ],
            row_to_entry,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

/// Shared body of the text and pattern searches. `predicate` is a SQL
/// expression over `preview` taking `?1`.
fn search_impl(
    conn: &Connection,
    predicate: &str,
    needle: &str,
    page: Page,
    sort: SortOrder,
) -> HistoryResult<Vec<HistoryEntry>> {
    let sql = format!(
        "SELECT {} FROM history WHERE {} ORDER BY {} LIMIT ?2 OFFSET ?3",
        ENTRY_COLUMNS,
        predicate,
        sort.order_by_clause()
    );

    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![needle, page.limit, page.offset], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(entries)
}

pub fn search_text_impl(
    conn: &Connection,
    substring: &str,
    page: Page,
    sort: SortOrder,
) -> HistoryResult<Vec<HistoryEntry>> {
    search_impl(
        conn,
        r"preview LIKE ?1 ESCAPE '\'",
        &like_pattern(substring),
        page,
        sort,
    )
}

/// Requires the `regexp` function registered on `conn`.
pub fn search_regex_impl(
    conn: &Connection,
    pattern: &str,
    page: Page,
    sort: SortOrder,
) -> HistoryResult<Vec<HistoryEntry>> {
    search_impl(conn, "preview REGEXP ?1", pattern, page, sort)
}

pub fn clear_impl(conn: &Connection, preserve_pinned: bool) -> HistoryResult<usize> {
    let sql = if preserve_pinned {
        "DELETE FROM history WHERE pinned = 0"
    } else {
        "DELETE FROM history"
    };
    Ok(conn.execute(sql, [])?)
}

pub fn clear_type_impl(
    conn: &Connection,
    content_type: ContentType,
    preserve_pinned: bool,
) -> HistoryResult<usize> {
    let sql = if preserve_pinned {
        "DELETE FROM history WHERE content_type = ?1 AND pinned = 0"
    } else {
        "DELETE FROM history WHERE content_type = ?1"
    };
    Ok(conn.execute(sql, params![content_type.as_str()])?)
}
