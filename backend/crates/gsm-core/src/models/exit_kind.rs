use serde::Serialize;

/// How a child process came to exit.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitKind {
    /// Exited on its own after a terminate request
    Graceful,
    /// Terminate had to escalate to a kill
    Forced,
    /// Nobody asked it to exit
    Unexpected,
}
