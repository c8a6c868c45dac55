//! cliptrail - clipboard history core
//!
//! Watches the clipboard, filters out blank, oversized and password-like
//! content, and keeps a de-duplicated, searchable history in SQLite.

pub mod clipboard_history;
pub mod config;
pub mod error;
pub mod logging;
