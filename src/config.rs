//! Stream configuration.

use crate::error::{Result, StreamError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Delay between an entry appearing and settling, leaving room for the
/// entry animation.
pub const SETTLE_DELAY: Duration = Duration::from_millis(5);

/// Delay between an entry starting to fade out and being removed.
pub const POST_FADE_DELAY: Duration = Duration::from_millis(500);

/// Stream configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamConfig {
    /// Max resident entries before the oldest is evicted.
    /// Default: 100
    pub max_messages: usize,

    /// How long an entry stays on screen, measured from its creation.
    /// Default: 60000
    pub display_timeout_ms: u64,

    /// Max buffered view events per render subscriber before it is dropped.
    /// Default: 64
    pub subscriber_buffer: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_messages: 100,
            display_timeout_ms: 60_000,
            subscriber_buffer: 64,
        }
    }
}

impl StreamConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StreamConfig = serde_json::from_str(json)
            .map_err(|e| StreamError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }

    pub fn with_display_timeout(mut self, timeout: Duration) -> Self {
        self.display_timeout_ms = timeout.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn with_subscriber_buffer(mut self, size: usize) -> Self {
        self.subscriber_buffer = size;
        self
    }

    /// Reject configurations that would make the buffer useless.
    pub fn validate(&self) -> Result<()> {
        if self.max_messages == 0 {
            return Err(StreamError::InvalidConfig(
                "maxMessages must be at least 1".to_string(),
            ));
        }
        if self.display_timeout_ms == 0 {
            return Err(StreamError::InvalidConfig(
                "displayTimeoutMs must be at least 1".to_string(),
            ));
        }
        if self.subscriber_buffer == 0 {
            return Err(StreamError::InvalidConfig(
                "subscriberBuffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn display_timeout(&self) -> Duration {
        Duration::from_millis(self.display_timeout_ms)
    }

    /// The full per-entry timeline for this configuration.
    pub fn timings(&self) -> LifecycleTimings {
        LifecycleTimings {
            settle: SETTLE_DELAY,
            display_timeout: self.display_timeout(),
            post_fade: POST_FADE_DELAY,
        }
    }
}

/// Per-entry timeline: settle after `settle`, fade after `display_timeout`
/// (both from creation), removal `post_fade` after the fade starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LifecycleTimings {
    pub settle: Duration,
    pub display_timeout: Duration,
    pub post_fade: Duration,
}

impl Default for LifecycleTimings {
    fn default() -> Self {
        StreamConfig::default().timings()
    }
}

impl LifecycleTimings {
    /// Total time an undisturbed entry stays resident.
    pub fn lifetime(&self) -> Duration {
        self.display_timeout + self.post_fade
    }
}
