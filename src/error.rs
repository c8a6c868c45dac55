use thiserror::Error;
use tracing::{error, warn};

use crate::clipboard_history::EntryId;

/// Error severity for UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // Blue - informational
    Warning,  // Yellow - recoverable
    Error,    // Red - operation failed
    Critical, // Red + modal - requires user action
}

/// Domain-specific errors for the clipboard history core
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to read clipboard: {0}")]
    Read(String),

    #[error("Failed to write clipboard: {0}")]
    Write(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Clipboard monitor is already running")]
    AlreadyRunning,

    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl HistoryError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Read(_) => ErrorSeverity::Info,
            Self::Write(_) => ErrorSeverity::Error,
            Self::Storage(_) => ErrorSeverity::Critical,
            Self::Pattern(_) => ErrorSeverity::Warning,
            Self::Config(_) => ErrorSeverity::Warning,
            Self::AlreadyRunning => ErrorSeverity::Info,
            Self::NotFound(_) => ErrorSeverity::Warning,
            Self::Io { .. } => ErrorSeverity::Error,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Read(msg) => format!("Could not read the clipboard: {}", msg),
            Self::Write(msg) => format!("Could not copy to the clipboard: {}", msg),
            Self::Storage(e) => format!("Clipboard history storage failed: {}", e),
            Self::Pattern(_) => "The search pattern is not a valid regular expression".to_string(),
            Self::Config(msg) => format!("Configuration issue: {}", msg),
            Self::AlreadyRunning => "Clipboard monitoring is already running".to_string(),
            Self::NotFound(_) => "That clipboard entry no longer exists".to_string(),
            Self::Io { path, .. } => format!("Could not access {}", path),
        }
    }
}

pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use cliptrail::error::ResultExt;
///
/// // A failed timestamp refresh should not abort a recall
/// store.update_last_accessed(&id, now).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_are_critical() {
        let err = HistoryError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_pattern_error_from_regex() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: HistoryError = regex_err.into();
        assert!(matches!(err, HistoryError::Pattern(_)));
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.user_message().contains("regular expression"));
    }

    #[test]
    fn test_not_found_message_includes_id() {
        let err = HistoryError::NotFound(EntryId::from("abc-123"));
        assert_eq!(err.to_string(), "Entry not found: abc-123");
    }

    #[test]
    fn test_log_err_returns_value_on_ok() {
        let ok: std::result::Result<u32, HistoryError> = Ok(7);
        assert_eq!(ok.log_err(), Some(7));
    }

    #[test]
    fn test_warn_on_err_swallows_error() {
        let err: std::result::Result<u32, HistoryError> = Err(HistoryError::AlreadyRunning);
        assert_eq!(err.warn_on_err(), None);
    }
}
