//! Clipboard access ports
//!
//! The embedding application supplies the OS clipboard through these traits.
//! [`MemoryClipboard`] is an in-process implementation for tests and
//! headless use.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{HistoryError, HistoryResult};

pub trait ClipboardReader: Send + Sync {
    /// Current clipboard text. Fails with `HistoryError::Read`.
    fn read_text(&self) -> HistoryResult<String>;
}

pub trait ClipboardWriter: Send + Sync {
    /// Replace the clipboard text. Fails with `HistoryError::Write`.
    fn write_text(&self, text: &str) -> HistoryResult<()>;
}

#[derive(Debug, Default)]
struct MemoryClipboardState {
    text: Option<String>,
    fail_reads: bool,
    writes: Vec<String>,
}

/// Shared in-memory clipboard. Clones see the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    state: Arc<Mutex<MemoryClipboardState>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a copy from another application
    pub fn set_text(&self, text: impl Into<String>) {
        self.state.lock().text = Some(text.into());
    }

    /// Make subsequent reads fail until turned off again
    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Everything written through [`ClipboardWriter`], oldest first
    pub fn writes(&self) -> Vec<String> {
        self.state.lock().writes.clone()
    }
}

impl ClipboardReader for MemoryClipboard {
    fn read_text(&self) -> HistoryResult<String> {
        let state = self.state.lock();
        if state.fail_reads {
            return Err(HistoryError::Read("clipboard unavailable".to_string()));
        }
        Ok(state.text.clone().unwrap_or_default())
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&self, text: &str) -> HistoryResult<()> {
        let mut state = self.state.lock();
        state.text = Some(text.to_string());
        state.writes.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_clipboard_reads_empty_string() {
        assert_eq!(MemoryClipboard::new().read_text().unwrap(), "");
    }

    #[test]
    fn test_write_is_visible_to_reads_and_recorded() {
        let clipboard = MemoryClipboard::new();
        let reader = clipboard.clone();

        clipboard.write_text("copied").unwrap();
        assert_eq!(reader.read_text().unwrap(), "copied");
        assert_eq!(clipboard.writes(), vec!["copied".to_string()]);
    }

    #[test]
    fn test_failing_reads() {
        let clipboard = MemoryClipboard::new();
        clipboard.set_text("x");
        clipboard.set_fail_reads(true);
        assert!(matches!(clipboard.read_text(), Err(HistoryError::Read(_))));

        clipboard.set_fail_reads(false);
        assert_eq!(clipboard.read_text().unwrap(), "x");
    }
}
