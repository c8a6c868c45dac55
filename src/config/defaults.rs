//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Clipboard poll interval
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 500;

/// Retention limits
pub const DEFAULT_MAX_ITEMS: usize = 100;
pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;

/// How often the retention policy runs (1 hour)
pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// Default flags
pub const DEFAULT_MONITORING_ENABLED: bool = true;
pub const DEFAULT_ALLOW_PASSWORD_LIKE_CONTENT: bool = false;

/// Preview length in characters
pub const DEFAULT_PREVIEW_LENGTH: usize = crate::clipboard_history::DEFAULT_PREVIEW_LENGTH;

/// Location of the user config file
pub const DEFAULT_CONFIG_PATH: &str = "~/.cliptrail/config.json";
