use error_location::ErrorLocation;
use std::result::Result as StdResult;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid server state: {value} {location}")]
    InvalidServerState {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid backup type: {value} {location}")]
    InvalidBackupType {
        value: String,
        location: ErrorLocation,
    },

    #[error("Invalid stream source: {value} {location}")]
    InvalidStreamSource {
        value: String,
        location: ErrorLocation,
    },
}

pub type Result<T> = StdResult<T, CoreError>;
