use crate::ServerState;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One recorded edge of the lifecycle state machine.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct StateTransition {
    pub from: ServerState,
    pub to: ServerState,
    pub at: DateTime<Utc>,
}
