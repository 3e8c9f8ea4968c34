use crate::{CoreError, CoreResult};

use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the supervised game server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServerState {
    /// No process attached
    #[default]
    Stopped,
    /// Process spawned, waiting for the readiness probe
    Starting,
    /// Process ready and accepting console commands
    Running,
    /// Termination requested, waiting for exit
    Stopping,
    /// Process exited without being asked to
    Crashed,
}

impl ServerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Crashed => "crashed",
        }
    }

    /// Whether `self -> next` is one of the documented lifecycle edges.
    pub fn can_transition_to(&self, next: ServerState) -> bool {
        matches!(
            (self, next),
            (Self::Stopped, Self::Starting)
                | (Self::Crashed, Self::Starting)
                | (Self::Starting, Self::Running)
                | (Self::Starting, Self::Stopping)
                | (Self::Starting, Self::Crashed)
                | (Self::Running, Self::Stopping)
                | (Self::Running, Self::Crashed)
                | (Self::Stopping, Self::Stopped)
                | (Self::Stopping, Self::Crashed)
        )
    }

    /// A process is attached (or being attached/detached).
    pub fn has_process(&self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Stopping)
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerState {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "stopped" => Ok(Self::Stopped),
            "starting" => Ok(Self::Starting),
            "running" => Ok(Self::Running),
            "stopping" => Ok(Self::Stopping),
            "crashed" => Ok(Self::Crashed),
            _ => Err(CoreError::InvalidServerState {
                value: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
