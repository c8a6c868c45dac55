//! Clipboard monitoring
//!
//! Two background threads: one polls the clipboard, one runs the retention
//! policy. Both re-read the live configuration every iteration and wake
//! immediately when the monitor is stopped.

use chrono::Utc;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::change_detection::{fingerprint, ClipboardChangeDetector};
use super::clipboard::ClipboardReader;
use super::recorder::{RecordOutcome, Recorder};
use super::retention::{CleanupReport, RetentionPlan};
use super::store::HistoryStore;
use crate::config::ConfigHandle;
use crate::error::{HistoryError, HistoryResult};

/// Cooperative stop flag shared by the background threads.
///
/// Waiting on the signal doubles as the loops' sleep, so a stop request
/// interrupts the wait instead of running out the interval.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (stopped, condvar) = &*self.inner;
        *stopped.lock() = true;
        condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Block for up to `timeout`. Returns true once shutdown was requested.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (stopped, condvar) = &*self.inner;
        let mut guard = stopped.lock();

        // A timeout too large to add to `now` waits for the trigger alone
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*guard {
                condvar.wait(&mut guard);
            }
            return true;
        };

        while !*guard {
            if condvar.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        *guard
    }
}

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Monitoring is disabled in the config; the clipboard was not read
    Paused,
    /// The clipboard could not be read; treated as no change
    ReadFailed,
    Unchanged,
    Recorded(RecordOutcome),
}

/// State shared between the monitor handle and its threads
struct MonitorCore {
    reader: Arc<dyn ClipboardReader>,
    store: Arc<dyn HistoryStore>,
    recorder: Recorder,
    config: ConfigHandle,
    detector: Mutex<ClipboardChangeDetector>,
}

impl MonitorCore {
    fn tick(&self) -> HistoryResult<TickOutcome> {
        if !self.config.snapshot().is_monitoring_enabled() {
            return Ok(TickOutcome::Paused);
        }

        let content = match self.reader.read_text() {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "Clipboard read failed, treating as unchanged");
                return Ok(TickOutcome::ReadFailed);
            }
        };

        let current = fingerprint(&content);
        // The snapshot counts as seen even if recording it fails below
        if !self.detector.lock().observe(current) {
            return Ok(TickOutcome::Unchanged);
        }

        let outcome = self
            .recorder
            .record_fingerprinted(&content, current, Utc::now())?;
        Ok(TickOutcome::Recorded(outcome))
    }

    /// Seed the detector with whatever is on the clipboard right now.
    fn prime(&self) {
        let mut detector = self.detector.lock();
        match self.reader.read_text() {
            Ok(content) => detector.prime(fingerprint(&content)),
            Err(e) => {
                debug!(error = %e, "No clipboard baseline at start");
                detector.reset();
            }
        }
    }

    fn cleanup(&self) -> HistoryResult<CleanupReport> {
        let plan = RetentionPlan::from_config(&self.config.snapshot(), Utc::now());
        self.store.apply_retention(&plan)
    }
}

struct RunningTasks {
    signal: ShutdownSignal,
    poll: JoinHandle<()>,
    cleanup: JoinHandle<()>,
}

pub struct ClipboardMonitor {
    core: Arc<MonitorCore>,
    running: Mutex<Option<RunningTasks>>,
}

impl ClipboardMonitor {
    pub fn new(
        reader: Arc<dyn ClipboardReader>,
        store: Arc<dyn HistoryStore>,
        config: ConfigHandle,
    ) -> Self {
        let recorder = Recorder::new(store.clone(), config.clone());
        Self {
            core: Arc::new(MonitorCore {
                reader,
                store,
                recorder,
                config,
                detector: Mutex::new(ClipboardChangeDetector::new()),
            }),
            running: Mutex::new(None),
        }
    }

    /// Start the poll and cleanup threads.
    ///
    /// The current clipboard content becomes the baseline and is not
    /// recorded. Retention runs once right away.
    pub fn start(&self) -> HistoryResult<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Err(HistoryError::AlreadyRunning);
        }

        let config = self.core.config.snapshot();
        info!(
            poll_interval_ms = config.get_polling_interval().as_millis() as u64,
            cleanup_interval_secs = config.get_cleanup_interval().as_secs(),
            max_items = config.get_max_items(),
            max_age_days = config.get_max_age_days(),
            "Starting clipboard monitor"
        );

        self.core.prime();

        let signal = ShutdownSignal::new();

        let poll = {
            let core = self.core.clone();
            let signal = signal.clone();
            thread::spawn(move || poll_loop(&core, &signal))
        };

        let cleanup = {
            let core = self.core.clone();
            let signal = signal.clone();
            thread::spawn(move || cleanup_loop(&core, &signal))
        };

        *running = Some(RunningTasks {
            signal,
            poll,
            cleanup,
        });
        Ok(())
    }

    /// Signal both threads and wait for them to exit. No-op when stopped.
    pub fn stop(&self) {
        let Some(tasks) = self.running.lock().take() else {
            return;
        };

        tasks.signal.trigger();
        for (name, handle) in [("poll", tasks.poll), ("cleanup", tasks.cleanup)] {
            if handle.join().is_err() {
                warn!(thread = name, "Clipboard monitor thread panicked");
            }
        }
        info!("Clipboard monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Run one poll tick on the calling thread.
    pub fn poll_once(&self) -> HistoryResult<TickOutcome> {
        self.core.tick()
    }

    /// Run the retention policy on the calling thread.
    pub fn run_cleanup(&self) -> HistoryResult<CleanupReport> {
        self.core.cleanup()
    }
}

impl Drop for ClipboardMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn poll_loop(core: &MonitorCore, signal: &ShutdownSignal) {
    debug!("Clipboard poll thread started");
    loop {
        if let Err(e) = core.tick() {
            warn!(error = %e, "Clipboard poll failed");
        }

        let interval = core.config.snapshot().get_polling_interval();
        if signal.wait_timeout(interval) {
            break;
        }
    }
    debug!("Clipboard poll thread stopping");
}

fn cleanup_loop(core: &MonitorCore, signal: &ShutdownSignal) {
    debug!("Clipboard cleanup thread started");
    loop {
        match core.cleanup() {
            Ok(report) if report.total() > 0 => {
                info!(
                    expired = report.expired,
                    overflow = report.overflow,
                    "Background cleanup completed"
                );
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Background cleanup failed"),
        }

        let interval = core.config.snapshot().get_cleanup_interval();
        if signal.wait_timeout(interval) {
            break;
        }
    }
    debug!("Clipboard cleanup thread stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard_history::clipboard::MemoryClipboard;
    use crate::clipboard_history::database::SqliteHistoryStore;
    use crate::clipboard_history::types::{ContentType, HistoryEntry, ListQuery};
    use crate::config::Config;
    use chrono::Duration as ChronoDuration;

    fn fast_config() -> Config {
        Config {
            polling_interval_ms: Some(10),
            ..Default::default()
        }
    }

    fn monitor_with(
        config: Config,
    ) -> (ClipboardMonitor, MemoryClipboard, Arc<SqliteHistoryStore>, ConfigHandle) {
        let clipboard = MemoryClipboard::new();
        let store = Arc::new(SqliteHistoryStore::open_in_memory().unwrap());
        let handle = ConfigHandle::new(config);
        let monitor = ClipboardMonitor::new(
            Arc::new(clipboard.clone()),
            store.clone(),
            handle.clone(),
        );
        (monitor, clipboard, store, handle)
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        condition()
    }

    #[test]
    fn test_shutdown_signal_wait_times_out() {
        let signal = ShutdownSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(5)));
        assert!(!signal.is_triggered());
    }

    #[test]
    fn test_shutdown_signal_wakes_waiter() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(30)))
        };

        signal.trigger();
        assert!(waiter.join().unwrap());
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_shutdown_signal_unbounded_timeout_still_wakes() {
        let signal = ShutdownSignal::new();
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait_timeout(Duration::MAX))
        };

        thread::sleep(Duration::from_millis(20));
        signal.trigger();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_huge_intervals_do_not_break_start_stop() {
        let (monitor, _, _, _) = monitor_with(Config {
            polling_interval_ms: Some(u64::MAX),
            cleanup_interval_secs: Some(u64::MAX),
            max_age_days: Some(100_000_000),
            ..Default::default()
        });

        assert_eq!(monitor.run_cleanup().unwrap().total(), 0);
        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(20));
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn test_storage_failure_still_marks_snapshot_seen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.sqlite");
        let clipboard = MemoryClipboard::new();
        let monitor = ClipboardMonitor::new(
            Arc::new(clipboard.clone()),
            Arc::new(SqliteHistoryStore::open(&path).unwrap()),
            ConfigHandle::new(Config::default()),
        );

        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE history")
            .unwrap();

        clipboard.set_text("copied while storage is broken");
        assert!(matches!(monitor.poll_once(), Err(HistoryError::Storage(_))));
        assert_eq!(monitor.poll_once().unwrap(), TickOutcome::Unchanged);
    }

    #[test]
    fn test_tick_records_new_content_once() {
        let (monitor, clipboard, store, _) = monitor_with(Config::default());

        clipboard.set_text("first copy");
        assert!(matches!(
            monitor.poll_once().unwrap(),
            TickOutcome::Recorded(RecordOutcome::Created(_))
        ));
        assert_eq!(monitor.poll_once().unwrap(), TickOutcome::Unchanged);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_a_b_a_sequence_keeps_two_entries() {
        let (monitor, clipboard, store, _) = monitor_with(Config::default());

        for text in ["alpha", "bravo", "alpha"] {
            clipboard.set_text(text);
            monitor.poll_once().unwrap();
        }

        assert_eq!(store.count().unwrap(), 2);
        let listed = store.list_by_recency(&ListQuery::recent(10)).unwrap();
        assert_eq!(listed[0].content, "alpha", "Re-copied entry moves to the top");
    }

    #[test]
    fn test_filtered_content_is_not_reprocessed() {
        let (monitor, clipboard, store, _) = monitor_with(Config::default());

        clipboard.set_text("Password123!");
        assert!(matches!(
            monitor.poll_once().unwrap(),
            TickOutcome::Recorded(RecordOutcome::Skipped(_))
        ));
        assert_eq!(monitor.poll_once().unwrap(), TickOutcome::Unchanged);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_paused_monitor_does_not_read_or_record() {
        let (monitor, clipboard, store, handle) = monitor_with(Config::default());
        handle.update(|c| c.monitoring_enabled = Some(false)).unwrap();

        clipboard.set_text("while paused");
        assert_eq!(monitor.poll_once().unwrap(), TickOutcome::Paused);
        assert_eq!(store.count().unwrap(), 0);

        handle.update(|c| c.monitoring_enabled = Some(true)).unwrap();
        assert!(matches!(
            monitor.poll_once().unwrap(),
            TickOutcome::Recorded(RecordOutcome::Created(_))
        ));
    }

    #[test]
    fn test_read_failure_is_no_change() {
        let (monitor, clipboard, store, _) = monitor_with(Config::default());
        clipboard.set_text("unreadable");
        clipboard.set_fail_reads(true);

        assert_eq!(monitor.poll_once().unwrap(), TickOutcome::ReadFailed);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_start_twice_is_an_error_and_stop_is_idempotent() {
        let (monitor, _, _, _) = monitor_with(fast_config());

        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert!(matches!(monitor.start(), Err(HistoryError::AlreadyRunning)));

        monitor.stop();
        assert!(!monitor.is_running());
        monitor.stop();

        monitor.start().unwrap();
        monitor.stop();
    }

    #[test]
    fn test_existing_clipboard_content_is_baseline() {
        let (monitor, clipboard, store, _) = monitor_with(fast_config());
        clipboard.set_text("there before start");

        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        assert_eq!(store.count().unwrap(), 0);

        clipboard.set_text("copied after start");
        assert!(wait_until(|| store.count().unwrap() == 1));
        monitor.stop();

        let listed = store.list_by_recency(&ListQuery::recent(10)).unwrap();
        assert_eq!(listed[0].content, "copied after start");
    }

    #[test]
    fn test_cleanup_runs_at_start() {
        let (monitor, _, store, _) = monitor_with(Config {
            max_items: Some(1),
            ..fast_config()
        });
        let now = Utc::now();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            let fp = fingerprint(text);
            let at = now - ChronoDuration::minutes(10 - i as i64);
            store
                .create(&HistoryEntry::new(text.to_string(), ContentType::Text, fp, 200, at))
                .unwrap();
        }

        monitor.start().unwrap();
        assert!(wait_until(|| store.count().unwrap() == 1));
        monitor.stop();

        let listed = store.list_by_recency(&ListQuery::recent(10)).unwrap();
        assert_eq!(listed[0].content, "three");
    }

    #[test]
    fn test_stop_interrupts_long_intervals() {
        let (monitor, _, _, _) = monitor_with(Config {
            polling_interval_ms: Some(60_000),
            cleanup_interval_secs: Some(3600),
            ..Default::default()
        });

        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        monitor.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_drop_stops_threads() {
        let (monitor, clipboard, store, _) = monitor_with(fast_config());
        monitor.start().unwrap();
        drop(monitor);

        clipboard.set_text("after drop");
        thread::sleep(Duration::from_millis(100));
        assert_eq!(store.count().unwrap(), 0);
    }
}
