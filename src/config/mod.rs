//! Configuration module - clipboard history settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.cliptrail/config.json
//! - Default values for all settings
//! - A shared handle the background loops read on every tick
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - The `Config` struct, getters and validation
//! - `loader` - File system loading and parsing
//! - `handle` - `ConfigHandle`, the live shared configuration

mod defaults;
mod handle;
mod loader;
mod types;

pub use defaults::{
    DEFAULT_ALLOW_PASSWORD_LIKE_CONTENT, DEFAULT_CLEANUP_INTERVAL_SECS, DEFAULT_MAX_AGE_DAYS,
    DEFAULT_MAX_ITEMS, DEFAULT_MONITORING_ENABLED, DEFAULT_POLLING_INTERVAL_MS,
};

pub use types::Config;

pub use handle::ConfigHandle;

pub use loader::{config_path, load_config, load_config_from};

#[cfg(test)]
pub use defaults::DEFAULT_PREVIEW_LENGTH;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
