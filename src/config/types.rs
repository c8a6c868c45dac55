//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::defaults::*;
use crate::clipboard_history::SortOrder;
use crate::error::{HistoryError, HistoryResult};

// ============================================
// MAIN CONFIG
// ============================================

/// User settings for the clipboard history core.
///
/// Every field is optional in the file; getters fall back to the `DEFAULT_*`
/// constants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Clipboard poll interval in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polling_interval_ms: Option<u64>,
    /// Maximum number of non-pinned entries kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    /// Non-pinned entries older than this many days are evicted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<u32>,
    /// When false the poll loop keeps running but skips every tick
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_enabled: Option<bool>,
    /// Record content that looks like a password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_password_like_content: Option<bool>,
    /// Seconds between retention runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_interval_secs: Option<u64>,
    /// Preview length (characters) computed when an entry is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_length: Option<usize>,
    /// Ordering used by listings and search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortOrder>,
}

impl Config {
    pub fn get_polling_interval(&self) -> Duration {
        Duration::from_millis(
            self.polling_interval_ms
                .unwrap_or(DEFAULT_POLLING_INTERVAL_MS),
        )
    }

    pub fn get_max_items(&self) -> usize {
        self.max_items.unwrap_or(DEFAULT_MAX_ITEMS)
    }

    pub fn get_max_age_days(&self) -> u32 {
        self.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS)
    }

    pub fn is_monitoring_enabled(&self) -> bool {
        self.monitoring_enabled
            .unwrap_or(DEFAULT_MONITORING_ENABLED)
    }

    pub fn allows_password_like_content(&self) -> bool {
        self.allow_password_like_content
            .unwrap_or(DEFAULT_ALLOW_PASSWORD_LIKE_CONTENT)
    }

    pub fn get_cleanup_interval(&self) -> Duration {
        Duration::from_secs(
            self.cleanup_interval_secs
                .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS),
        )
    }

    pub fn get_preview_length(&self) -> usize {
        self.preview_length.unwrap_or(DEFAULT_PREVIEW_LENGTH)
    }

    pub fn get_sort_order(&self) -> SortOrder {
        self.sort_by.unwrap_or_default()
    }

    /// Reject values that would stall the loops or empty the history.
    pub fn validate(&self) -> HistoryResult<()> {
        let zero_fields = [
            ("pollingIntervalMs", self.polling_interval_ms == Some(0)),
            ("maxItems", self.max_items == Some(0)),
            ("maxAgeDays", self.max_age_days == Some(0)),
            ("cleanupIntervalSecs", self.cleanup_interval_secs == Some(0)),
            ("previewLength", self.preview_length == Some(0)),
        ];

        if let Some((field, _)) = zero_fields.iter().find(|(_, is_zero)| *is_zero) {
            return Err(HistoryError::Config(format!(
                "{} must be greater than zero",
                field
            )));
        }
        Ok(())
    }
}
