use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity of a live child process.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub started_at: DateTime<Utc>,
    pub command_line: String,
}

impl ProcessRecord {
    pub fn new(pid: u32, started_at: DateTime<Utc>, command: &str, args: &[String]) -> Self {
        let command_line = std::iter::once(command)
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            pid,
            started_at,
            command_line,
        }
    }
}
