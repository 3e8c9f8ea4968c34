use crate::ExitKind;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    pub kind: ExitKind,
    pub exited_at: DateTime<Utc>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn is_unexpected(&self) -> bool {
        self.kind == ExitKind::Unexpected
    }
}
