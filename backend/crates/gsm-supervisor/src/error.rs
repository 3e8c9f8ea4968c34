use gsm_core::ServerState;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn server process: {message} {location}")]
    Spawn {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server is not running {location}")]
    NotRunning { location: ErrorLocation },

    #[error("Another lifecycle operation is in progress {location}")]
    OperationInProgress { location: ErrorLocation },

    #[error("Cannot {operation} while server is {state} {location}")]
    InvalidState {
        operation: &'static str,
        state: ServerState,
        location: ErrorLocation,
    },

    #[error("Server failed to start: {message} {location}")]
    StartFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Server did not stop within {timeout_secs}s {location}")]
    StopTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Invalid console command: {message} {location}")]
    InvalidCommand {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn not_running() -> Self {
        Self::NotRunning {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn operation_in_progress() -> Self {
        Self::OperationInProgress {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn start_failed<S: Into<String>>(message: S) -> Self {
        Self::StartFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_state(operation: &'static str, state: ServerState) -> Self {
        Self::InvalidState {
            operation,
            state,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "SPAWN_FAILED",
            Self::NotRunning { .. } => "NOT_RUNNING",
            Self::OperationInProgress { .. } => "OPERATION_IN_PROGRESS",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::StartFailed { .. } => "START_FAILED",
            Self::StopTimeout { .. } => "STOP_TIMEOUT",
            Self::InvalidCommand { .. } => "INVALID_COMMAND",
            Self::Io { .. } => "IO_ERROR",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => {
                "Check process.command and process.working_dir in the configuration."
            }
            Self::NotRunning { .. } => "Start the server before sending console commands.",
            Self::OperationInProgress { .. } => {
                "Wait for the current start, stop or restart to finish and try again."
            }
            Self::InvalidState { .. } => "Refresh the server status and retry.",
            Self::StartFailed { .. } => {
                "Check the server console log for errors. \
                   Increase process.startup_timeout_secs if the server is just slow."
            }
            Self::StopTimeout { .. } => {
                "The server process did not exit after being killed. \
                   Check for a stuck process on the host."
            }
            Self::InvalidCommand { .. } => "Send a single non-empty console line.",
            Self::Io { .. } => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<std::io::Error> for SupervisorError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
