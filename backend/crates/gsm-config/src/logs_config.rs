use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

// Ring buffer capacity (lines)
pub const MIN_RING_CAPACITY: usize = 1;
pub const MAX_RING_CAPACITY: usize = 100_000;
pub const DEFAULT_RING_CAPACITY: usize = 1000;

// Per-subscriber queue before lines are dropped for that subscriber
pub const MIN_SUBSCRIBER_BUFFER: usize = 1;
pub const MAX_SUBSCRIBER_BUFFER: usize = 65_536;
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// Console log fan-out settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsConfig {
    pub ring_capacity: usize,
    pub subscriber_buffer: usize,
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
        }
    }
}

impl LogsConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.ring_capacity < MIN_RING_CAPACITY || self.ring_capacity > MAX_RING_CAPACITY {
            return Err(ConfigError::config(format!(
                "logs.ring_capacity must be {}-{}, got {}",
                MIN_RING_CAPACITY, MAX_RING_CAPACITY, self.ring_capacity
            )));
        }

        if self.subscriber_buffer < MIN_SUBSCRIBER_BUFFER
            || self.subscriber_buffer > MAX_SUBSCRIBER_BUFFER
        {
            return Err(ConfigError::config(format!(
                "logs.subscriber_buffer must be {}-{}, got {}",
                MIN_SUBSCRIBER_BUFFER, MAX_SUBSCRIBER_BUFFER, self.subscriber_buffer
            )));
        }

        Ok(())
    }
}
