use gsm_core::ServerState;
use gsm_db::DbError;
use gsm_supervisor::SupervisorError;

use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;
use uuid::Uuid;
use zip::result::ZipError;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("Another backup operation is in progress {location}")]
    Busy { location: ErrorLocation },

    #[error("{entity} not found: {id} {location}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
        location: ErrorLocation,
    },

    #[error("Server must be stopped, it is {state} {location}")]
    ServerRunning {
        state: ServerState,
        location: ErrorLocation,
    },

    #[error("Restore failed: {message} {location}")]
    RestoreFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Archive error: {source} {location}")]
    Archive {
        #[source]
        source: ZipError,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Database error: {source} {location}")]
    Database {
        #[source]
        source: DbError,
        location: ErrorLocation,
    },

    #[error("Supervisor error: {source} {location}")]
    Supervisor {
        #[source]
        source: SupervisorError,
        location: ErrorLocation,
    },

    #[error("Invalid schedule: {message} {location}")]
    InvalidSchedule {
        message: String,
        location: ErrorLocation,
    },
}

impl BackupError {
    #[track_caller]
    pub fn busy() -> Self {
        Self::Busy {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn backup_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Backup",
            id,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn schedule_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Schedule",
            id,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn server_running(state: ServerState) -> Self {
        Self::ServerRunning {
            state,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn restore_failed<S: Into<String>>(message: S) -> Self {
        Self::RestoreFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_schedule<S: Into<String>>(message: S) -> Self {
        Self::InvalidSchedule {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "BACKUP_BUSY",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ServerRunning { .. } => "SERVER_RUNNING",
            Self::RestoreFailed { .. } => "RESTORE_FAILED",
            Self::Archive { .. } => "ARCHIVE_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Supervisor { source, .. } => source.error_code(),
            Self::InvalidSchedule { .. } => "INVALID_SCHEDULE",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Busy { .. } => "Wait for the running backup or restore to finish and try again.",
            Self::NotFound { .. } => "Refresh the list; the item may have been deleted.",
            Self::ServerRunning { .. } => "Stop the server before restoring a backup.",
            Self::RestoreFailed { .. } => {
                "The live data directory was left untouched. Check the logs and free disk space."
            }
            Self::Archive { .. } => "The archive could not be written or read. It may be corrupt.",
            Self::Io { .. } => "Check permissions and free space in the data and backup directories.",
            Self::Database { .. } => "Check the database file and its permissions.",
            Self::Supervisor { source, .. } => source.recovery_hint(),
            Self::InvalidSchedule { .. } => {
                "Use a 5-field cron expression (minute hour day month weekday) and a non-empty name."
            }
        }
    }
}

impl From<std::io::Error> for BackupError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<ZipError> for BackupError {
    #[track_caller]
    fn from(source: ZipError) -> Self {
        Self::Archive {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<DbError> for BackupError {
    #[track_caller]
    fn from(source: DbError) -> Self {
        Self::Database {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SupervisorError> for BackupError {
    #[track_caller]
    fn from(source: SupervisorError) -> Self {
        Self::Supervisor {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
