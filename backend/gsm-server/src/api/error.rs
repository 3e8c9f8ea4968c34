//! REST API error types
//!
//! Every failure leaves the API as `{ "error": { "code", "message", "hint" } }`
//! with a status code derived from the error kind.

use gsm_backup::BackupError;
use gsm_db::DbError;
use gsm_supervisor::SupervisorError;

use std::panic::Location;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use error_location::ErrorLocation;
use serde::Serialize;
use thiserror::Error;

/// JSON error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    /// Machine-readable error kind (e.g. "NOT_RUNNING", "BACKUP_BUSY")
    pub code: String,
    pub message: String,
    /// What the operator can do about it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// API errors with associated HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404
    #[error("Resource not found: {message} {location}")]
    NotFound {
        code: &'static str,
        message: String,
        hint: Option<String>,
        location: ErrorLocation,
    },

    /// 400
    #[error("Validation failed: {message} {location}")]
    Validation {
        code: &'static str,
        message: String,
        hint: Option<String>,
        location: ErrorLocation,
    },

    /// 403, the caller's role lacks the capability
    #[error("Forbidden: {message} {location}")]
    Forbidden {
        message: String,
        location: ErrorLocation,
    },

    /// 409, the request conflicts with the current server or backup state
    #[error("Conflict: {message} {location}")]
    Conflict {
        code: &'static str,
        message: String,
        hint: Option<String>,
        location: ErrorLocation,
    },

    /// 504
    #[error("Timed out: {message} {location}")]
    Timeout {
        code: &'static str,
        message: String,
        hint: Option<String>,
        location: ErrorLocation,
    },

    /// 500
    #[error("Internal error: {message} {location}")]
    Internal {
        code: &'static str,
        message: String,
        hint: Option<String>,
        location: ErrorLocation,
    },
}

impl ApiError {
    #[track_caller]
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            code: "VALIDATION_ERROR",
            message: message.into(),
            hint: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let body = match self {
            ApiError::Forbidden { message, .. } => ApiErrorBody {
                code: "FORBIDDEN".into(),
                message,
                hint: None,
            },
            ApiError::NotFound {
                code, message, hint, ..
            }
            | ApiError::Validation {
                code, message, hint, ..
            }
            | ApiError::Conflict {
                code, message, hint, ..
            }
            | ApiError::Timeout {
                code, message, hint, ..
            }
            | ApiError::Internal {
                code, message, hint, ..
            } => ApiErrorBody {
                code: code.into(),
                message,
                hint,
            },
        };

        (status, Json(ApiErrorResponse { error: body })).into_response()
    }
}

impl From<SupervisorError> for ApiError {
    #[track_caller]
    fn from(e: SupervisorError) -> Self {
        let code = e.error_code();
        let message = e.to_string();
        let hint = Some(e.recovery_hint().to_string());
        let location = ErrorLocation::from(Location::caller());

        match e {
            SupervisorError::NotRunning { .. }
            | SupervisorError::OperationInProgress { .. }
            | SupervisorError::InvalidState { .. } => ApiError::Conflict {
                code,
                message,
                hint,
                location,
            },
            SupervisorError::InvalidCommand { .. } => ApiError::Validation {
                code,
                message,
                hint,
                location,
            },
            SupervisorError::StopTimeout { .. } => ApiError::Timeout {
                code,
                message,
                hint,
                location,
            },
            SupervisorError::Spawn { .. }
            | SupervisorError::StartFailed { .. }
            | SupervisorError::Io { .. } => ApiError::Internal {
                code,
                message,
                hint,
                location,
            },
        }
    }
}

impl From<BackupError> for ApiError {
    #[track_caller]
    fn from(e: BackupError) -> Self {
        let code = e.error_code();
        let message = e.to_string();
        let hint = Some(e.recovery_hint().to_string());
        let location = ErrorLocation::from(Location::caller());

        match e {
            BackupError::Supervisor { source, .. } => ApiError::from(source),
            BackupError::Busy { .. } | BackupError::ServerRunning { .. } => ApiError::Conflict {
                code,
                message,
                hint,
                location,
            },
            BackupError::NotFound { .. } => ApiError::NotFound {
                code,
                message,
                hint,
                location,
            },
            BackupError::InvalidSchedule { .. } => ApiError::Validation {
                code,
                message,
                hint,
                location,
            },
            BackupError::RestoreFailed { .. }
            | BackupError::Archive { .. }
            | BackupError::Io { .. }
            | BackupError::Database { .. } => ApiError::Internal {
                code,
                message,
                hint,
                location,
            },
        }
    }
}

impl From<DbError> for ApiError {
    #[track_caller]
    fn from(e: DbError) -> Self {
        // Don't expose internal database details to clients
        log::error!("Database error: {}", e);
        ApiError::Internal {
            code: "DATABASE_ERROR",
            message: "Database operation failed".to_string(),
            hint: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<uuid::Error> for ApiError {
    #[track_caller]
    fn from(e: uuid::Error) -> Self {
        ApiError::Validation {
            code: "VALIDATION_ERROR",
            message: format!("Invalid UUID format: {}", e),
            hint: None,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
