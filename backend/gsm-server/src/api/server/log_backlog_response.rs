use crate::LogLineDto;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LogBacklogResponse {
    pub lines: Vec<LogLineDto>,
    /// Lines lost across all live viewers since startup
    pub dropped_lines: u64,
}
