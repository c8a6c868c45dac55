//! Structured JSONL logging plus human-readable stderr output.
//!
//! This module provides dual-output logging:
//! - **JSONL to file** (~/.cliptrail/logs/cliptrail.jsonl) - structured for tooling
//! - **Compact to stderr** - human-readable for developers
//!
//! # Usage
//!
//! ```rust,ignore
//! use cliptrail::logging;
//!
//! // Initialize logging - MUST keep guard alive for duration of program
//! let _guard = logging::init();
//!
//! // Use tracing macros directly
//! tracing::info!(event_type = "app_start", "Application started");
//! ```
//!
//! Clipboard content never goes to the logs verbatim. Log lengths, or a
//! short [`content_preview`] for content already known not to be sensitive.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_NAME: &str = "cliptrail.jsonl";

/// Characters of clipboard content allowed into a log line
const LOG_PREVIEW_CHARS: usize = 24;

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// `default_filter` applies when `RUST_LOG` is not set.
pub fn init_with_filter(default_filter: &str) -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);

    // Logging still works on stderr if the file cannot be opened
    let file: Box<dyn Write + Send> = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    };

    // Non-blocking writer keeps file I/O off the poll thread
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // JSONL layer for file output
    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    // Compact layer for stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("[LOGGING] Subscriber already installed: {}", e);
    }

    tracing::debug!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// [`init_with_filter`] with the default `info` level.
pub fn init() -> LoggingGuard {
    init_with_filter("info")
}

/// Get the log directory path (~/.cliptrail/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".cliptrail").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("cliptrail-logs"))
}

/// Get the path to the JSONL log file
pub fn log_path() -> PathBuf {
    get_log_dir().join(LOG_FILE_NAME)
}

/// Short single-line rendering of clipboard content for log fields.
pub fn content_preview(content: &str) -> String {
    let single_line: String = content
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(LOG_PREVIEW_CHARS + 1)
        .collect();

    if single_line.chars().count() > LOG_PREVIEW_CHARS {
        let head: String = single_line.chars().take(LOG_PREVIEW_CHARS).collect();
        format!("{}…", head)
    } else {
        single_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_is_jsonl_under_cliptrail() {
        let path = log_path();
        assert!(path.ends_with("logs/cliptrail.jsonl"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("jsonl"));
    }

    #[test]
    fn test_content_preview_short_text_unchanged() {
        assert_eq!(content_preview("hello"), "hello");
    }

    #[test]
    fn test_content_preview_flattens_and_bounds() {
        let preview = content_preview("line one\nline two\tand a lot more text after it");
        assert!(!preview.contains('\n'));
        assert!(!preview.contains('\t'));
        assert!(preview.ends_with('…'));
        assert_eq!(preview.chars().count(), LOG_PREVIEW_CHARS + 1);
    }
}
