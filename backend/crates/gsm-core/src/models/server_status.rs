use crate::{ProcessExit, ServerState, StateTransition};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time view of the supervisor for the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct ServerStatus {
    pub state: ServerState,
    pub pid: Option<u32>,
    pub command_line: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub uptime_secs: Option<i64>,
    pub memory_bytes: Option<u64>,
    pub players_online: Option<u32>,
    pub last_exit: Option<ProcessExit>,
    pub log_subscribers: usize,
    pub dropped_lines: u64,
    pub transitions: Vec<StateTransition>,
}
