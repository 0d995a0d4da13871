use std::time::Duration;

use hp_core::{Dialect, HoneyPotError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Engine configuration; persisted by the host as camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOptions {
    pub automatic: bool,
    pub interval_ms: u64,
    pub dialect: Dialect,
    pub title_expression: Option<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            automatic: true,
            interval_ms: DEFAULT_INTERVAL_MS,
            dialect: Dialect::default(),
            title_expression: None,
        }
    }
}

impl SyncOptions {
    /// A zero interval means "not configured" and falls back to the default.
    pub fn interval(&self) -> Duration {
        if self.interval_ms == 0 {
            Duration::from_millis(DEFAULT_INTERVAL_MS)
        } else {
            Duration::from_millis(self.interval_ms)
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, HoneyPotError> {
        serde_json::from_str(raw)
            .map_err(|error| HoneyPotError::new("OPTIONS_INVALID", error.to_string()))
    }
}
