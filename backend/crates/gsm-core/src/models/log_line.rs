use crate::StreamSource;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single line of console output. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub stream: StreamSource,
    pub text: String,
}

impl LogLine {
    pub fn new(timestamp: DateTime<Utc>, stream: StreamSource, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            stream,
            text: text.into(),
        }
    }

    pub fn stdout(timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(timestamp, StreamSource::Stdout, text)
    }

    pub fn stderr(timestamp: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self::new(timestamp, StreamSource::Stderr, text)
    }
}
