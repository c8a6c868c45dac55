//! Shared, live configuration
//!
//! Background loops read a fresh snapshot on every tick, so updates made
//! through the handle take effect without restarting the monitor.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use super::types::Config;
use crate::error::HistoryResult;

#[derive(Debug, Clone, Default)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Config>>,
}

impl ConfigHandle {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> Config {
        self.inner.read().clone()
    }

    /// Replace the whole configuration. Invalid values are rejected and the
    /// previous configuration stays in effect.
    pub fn replace(&self, config: Config) -> HistoryResult<()> {
        config.validate()?;
        *self.inner.write() = config;
        info!("Configuration replaced");
        Ok(())
    }

    /// Apply `edit` to a copy of the configuration and commit it if valid.
    pub fn update(&self, edit: impl FnOnce(&mut Config)) -> HistoryResult<Config> {
        let mut guard = self.inner.write();
        let mut candidate = guard.clone();
        edit(&mut candidate);

        if let Err(e) = candidate.validate() {
            warn!(error = %e, "Rejected configuration update");
            return Err(e);
        }

        *guard = candidate.clone();
        Ok(candidate)
    }
}
