//! Clipboard history facade
//!
//! The operations a UI or CLI layer calls. Wraps the store, the monitor and
//! the clipboard writer behind one handle.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::clipboard::{ClipboardReader, ClipboardWriter};
use super::monitor::{ClipboardMonitor, TickOutcome};
use super::recorder::{RecordOutcome, Recorder};
use super::retention::CleanupReport;
use super::store::HistoryStore;
use super::types::{ContentType, EntryId, HistoryEntry, ListQuery, Page};
use crate::config::ConfigHandle;
use crate::error::{HistoryError, HistoryResult, ResultExt};

pub struct ClipboardHistory {
    store: Arc<dyn HistoryStore>,
    writer: Arc<dyn ClipboardWriter>,
    config: ConfigHandle,
    recorder: Recorder,
    monitor: ClipboardMonitor,
}

impl ClipboardHistory {
    pub fn new(
        reader: Arc<dyn ClipboardReader>,
        writer: Arc<dyn ClipboardWriter>,
        store: Arc<dyn HistoryStore>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            recorder: Recorder::new(store.clone(), config.clone()),
            monitor: ClipboardMonitor::new(reader, store.clone(), config.clone()),
            store,
            writer,
            config,
        }
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn start(&self) -> HistoryResult<()> {
        self.monitor.start()
    }

    pub fn stop(&self) {
        self.monitor.stop()
    }

    pub fn is_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Most recent entries, pinned first, in the configured order
    pub fn get_recent(&self, limit: usize) -> HistoryResult<Vec<HistoryEntry>> {
        self.list(&ListQuery {
            sort: self.config.snapshot().get_sort_order(),
            ..ListQuery::recent(limit)
        })
    }

    pub fn list(&self, query: &ListQuery) -> HistoryResult<Vec<HistoryEntry>> {
        self.store.list_by_recency(query)
    }

    /// Search previews. A blank query returns the recent listing.
    pub fn search(
        &self,
        query: &str,
        use_regex: bool,
        limit: usize,
        offset: usize,
    ) -> HistoryResult<Vec<HistoryEntry>> {
        let sort = self.config.snapshot().get_sort_order();
        let page = Page::new(limit, offset);

        if query.trim().is_empty() {
            return self.list(&ListQuery {
                page,
                content_type: None,
                sort,
            });
        }

        let results = if use_regex {
            self.store.search_by_pattern(query, page, sort)?
        } else {
            self.store.search_by_text(query, page, sort)?
        };
        debug!(
            query_len = query.len(),
            use_regex,
            count = results.len(),
            "Searched clipboard history"
        );
        Ok(results)
    }

    pub fn get(&self, id: &EntryId) -> HistoryResult<HistoryEntry> {
        self.store
            .get(id)?
            .ok_or_else(|| HistoryError::NotFound(id.clone()))
    }

    pub fn pin(&self, id: &EntryId, pinned: bool) -> HistoryResult<()> {
        if !self.store.set_pinned(id, pinned)? {
            return Err(HistoryError::NotFound(id.clone()));
        }
        info!(id = %id, pinned, "Updated pin status");
        Ok(())
    }

    pub fn delete(&self, id: &EntryId) -> HistoryResult<()> {
        if !self.store.delete(id)? {
            return Err(HistoryError::NotFound(id.clone()));
        }
        info!(id = %id, "Deleted clipboard entry");
        Ok(())
    }

    pub fn clear_all(&self, preserve_pinned: bool) -> HistoryResult<usize> {
        self.store.clear_all(preserve_pinned)
    }

    pub fn clear_by_type(
        &self,
        content_type: ContentType,
        preserve_pinned: bool,
    ) -> HistoryResult<usize> {
        self.store.clear_by_type(content_type, preserve_pinned)
    }

    /// Put an entry's content back on the clipboard and mark it as used.
    pub fn recall_to_clipboard(&self, id: &EntryId) -> HistoryResult<HistoryEntry> {
        let entry = self.get(id)?;
        self.writer.write_text(&entry.content)?;

        let now = Utc::now();
        // Clipboard is already written at this point
        if self.store.update_last_accessed(id, now).warn_on_err().is_some() {
            info!(id = %id, "Recalled clipboard entry");
        }
        Ok(entry)
    }

    /// Recall the entry at the top of the recent listing, if any.
    pub fn paste_last(&self) -> HistoryResult<Option<HistoryEntry>> {
        match self.get_recent(1)?.into_iter().next() {
            Some(entry) => self.recall_to_clipboard(&entry.id).map(Some),
            None => Ok(None),
        }
    }

    /// Record content directly, bypassing change detection.
    pub fn record(&self, content: &str) -> HistoryResult<RecordOutcome> {
        self.recorder.record(content)
    }

    pub fn poll_once(&self) -> HistoryResult<TickOutcome> {
        self.monitor.poll_once()
    }

    pub fn run_cleanup(&self) -> HistoryResult<CleanupReport> {
        self.monitor.run_cleanup()
    }

    /// Flip `monitoringEnabled` and return the new value.
    pub fn toggle_monitoring(&self) -> HistoryResult<bool> {
        let updated = self
            .config
            .update(|c| c.monitoring_enabled = Some(!c.is_monitoring_enabled()))?;
        let enabled = updated.is_monitoring_enabled();
        info!(enabled, "Toggled clipboard monitoring");
        Ok(enabled)
    }
}
