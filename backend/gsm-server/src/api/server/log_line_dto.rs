use gsm_core::LogLine;

use serde::Serialize;

/// One console line as sent to API clients.
#[derive(Debug, Serialize)]
pub struct LogLineDto {
    pub timestamp: String,
    pub stream: String,
    pub text: String,
    /// Lines this viewer has missed so far
    pub dropped_lines: u64,
}

impl LogLineDto {
    pub fn new(line: LogLine, dropped_lines: u64) -> Self {
        Self {
            timestamp: line.timestamp.to_rfc3339(),
            stream: line.stream.as_str().to_string(),
            text: line.text,
            dropped_lines,
        }
    }
}
