//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use storyfeed_core::Backoff;
use storyfeed_core::backoff::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use storyfeed_core::pagination::DEFAULT_LIMIT;

/// Tunables for a [`Feed`](crate::Feed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Stories per page.
    pub page_size: u32,
    /// Delay before the first reconnect, in milliseconds.
    pub backoff_base_ms: u64,
    /// Reconnect attempts before a session fails.
    pub max_attempts: u32,
}

impl FeedConfig {
    /// The reconnect policy described by this config.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(Duration::from_millis(self.backoff_base_ms), self.max_attempts)
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_LIMIT,
            backoff_base_ms: DEFAULT_BASE_DELAY.as_millis() as u64,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}
