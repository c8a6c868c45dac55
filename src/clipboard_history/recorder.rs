//! Classify, de-duplicate and persist one clipboard snapshot

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use super::change_detection::{fingerprint, Fingerprint};
use super::classifier::{classify, Classification, SkipReason};
use super::store::{HistoryStore, Upsert};
use super::types::{EntryId, HistoryEntry};
use crate::config::ConfigHandle;
use crate::error::HistoryResult;
use crate::logging::content_preview;

/// What happened to a recorded snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new entry was stored
    Created(EntryId),
    /// An entry with the same fingerprint existed; its recency was refreshed
    Refreshed(EntryId),
    /// The classifier rejected the content
    Skipped(SkipReason),
}

impl RecordOutcome {
    pub fn entry_id(&self) -> Option<&EntryId> {
        match self {
            RecordOutcome::Created(id) | RecordOutcome::Refreshed(id) => Some(id),
            RecordOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct Recorder {
    store: Arc<dyn HistoryStore>,
    config: ConfigHandle,
}

impl Recorder {
    pub fn new(store: Arc<dyn HistoryStore>, config: ConfigHandle) -> Self {
        Self { store, config }
    }

    pub fn record(&self, content: &str) -> HistoryResult<RecordOutcome> {
        self.record_fingerprinted(content, fingerprint(content), Utc::now())
    }

    /// Record content whose fingerprint the caller already computed.
    pub fn record_fingerprinted(
        &self,
        content: &str,
        fingerprint: Fingerprint,
        now: DateTime<Utc>,
    ) -> HistoryResult<RecordOutcome> {
        let config = self.config.snapshot();

        let content_type = match classify(content, config.allows_password_like_content()) {
            Classification::Skip(reason) => {
                debug!(
                    reason = reason.as_str(),
                    len = content.len(),
                    "Skipping clipboard content"
                );
                return Ok(RecordOutcome::Skipped(reason));
            }
            Classification::Record(content_type) => content_type,
        };

        let entry = HistoryEntry::new(
            content.to_string(),
            content_type,
            fingerprint,
            config.get_preview_length(),
            now,
        );
        if let Upsert::Touched(existing) = self.store.create_or_touch(&entry)? {
            debug!(id = %existing, "Refreshed existing clipboard entry");
            return Ok(RecordOutcome::Refreshed(existing));
        }

        // Only content that passed the password filter is previewed
        let log_preview =
            (!config.allows_password_like_content()).then(|| content_preview(content));
        debug!(
            id = %entry.id,
            content_type = content_type.as_str(),
            len = content.len(),
            preview = ?log_preview,
            "Recorded clipboard entry"
        );
        Ok(RecordOutcome::Created(entry.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard_history::classifier::MAX_CONTENT_BYTES;
    use crate::clipboard_history::database::SqliteHistoryStore;
    use crate::clipboard_history::types::{ContentType, ListQuery};
    use crate::config::Config;
    use chrono::Duration;
    use std::sync::Barrier;
    use std::thread;

    fn recorder_with(config: Config) -> (Recorder, Arc<SqliteHistoryStore>) {
        let store = Arc::new(SqliteHistoryStore::open_in_memory().unwrap());
        let recorder = Recorder::new(store.clone(), ConfigHandle::new(config));
        (recorder, store)
    }

    #[test]
    fn test_new_content_creates_entry() {
        let (recorder, store) = recorder_with(Config::default());

        let outcome = recorder.record("/home/u/pic.png").unwrap();
        let id = outcome.entry_id().cloned().unwrap();
        assert!(matches!(outcome, RecordOutcome::Created(_)));

        let entry = store.get(&id).unwrap().unwrap();
        assert_eq!(entry.content_type, ContentType::Image);
        assert_eq!(entry.fingerprint, fingerprint("/home/u/pic.png"));
    }

    #[test]
    fn test_duplicate_refreshes_last_accessed() {
        let (recorder, store) = recorder_with(Config::default());
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let t1 = t0 + Duration::minutes(10);

        let first = recorder
            .record_fingerprinted("hello", fingerprint("hello"), t0)
            .unwrap();
        let second = recorder
            .record_fingerprinted("hello", fingerprint("hello"), t1)
            .unwrap();

        let id = first.entry_id().cloned().unwrap();
        assert_eq!(second, RecordOutcome::Refreshed(id.clone()));
        assert_eq!(store.count().unwrap(), 1);

        let entry = store.get(&id).unwrap().unwrap();
        assert_eq!(entry.created_at, t0);
        assert_eq!(entry.last_accessed_at, t1);
    }

    #[test]
    fn test_concurrent_duplicate_records_never_fail() {
        let (recorder, store) = recorder_with(Config::default());
        let rounds = 50;

        for round in 0..rounds {
            let content = format!("shared copy {}", round);
            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let recorder = recorder.clone();
                    let barrier = barrier.clone();
                    let content = content.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        recorder.record(&content)
                    })
                })
                .collect();

            let outcomes: Vec<_> = handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect();
            let created = outcomes
                .iter()
                .filter(|o| matches!(o, RecordOutcome::Created(_)))
                .count();
            assert_eq!(created, 1, "Exactly one thread creates the entry");
            assert_eq!(outcomes[0].entry_id(), outcomes[1].entry_id());
        }

        assert_eq!(store.count().unwrap(), rounds);
    }

    #[test]
    fn test_password_like_content_is_not_stored() {
        let (recorder, store) = recorder_with(Config::default());

        let outcome = recorder.record("Password123!").unwrap();
        assert_eq!(outcome, RecordOutcome::Skipped(SkipReason::PasswordLike));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_password_like_content_stored_when_allowed() {
        let (recorder, store) = recorder_with(Config {
            allow_password_like_content: Some(true),
            ..Default::default()
        });

        assert!(matches!(
            recorder.record("Password123!").unwrap(),
            RecordOutcome::Created(_)
        ));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_blank_and_oversized_content_are_skipped() {
        let (recorder, store) = recorder_with(Config::default());

        assert_eq!(
            recorder.record("  \n").unwrap(),
            RecordOutcome::Skipped(SkipReason::Empty)
        );
        let big = "a".repeat(MAX_CONTENT_BYTES + 1);
        assert_eq!(
            recorder.record(&big).unwrap(),
            RecordOutcome::Skipped(SkipReason::TooLarge)
        );
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_preview_uses_configured_length() {
        let (recorder, store) = recorder_with(Config {
            preview_length: Some(5),
            ..Default::default()
        });

        recorder.record("abcdefghij").unwrap();
        let entries = store.list_by_recency(&ListQuery::recent(1)).unwrap();
        assert_eq!(entries[0].preview, "abcde...");
        assert_eq!(entries[0].content, "abcdefghij");
    }
}
