use std::panic::Location;
use std::path::PathBuf;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum ConfigError {
    #[error("{category} error: {message} {location}")]
    Generic {
        category: &'static str,
        message: String,
        location: ErrorLocation,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[track_caller]
    pub fn config<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Config",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn database<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Database",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Process",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn backup<S: Into<String>>(message: S) -> Self {
        ConfigError::Generic {
            category: "Backup",
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Short category name, used when reporting startup failures.
    pub fn category(&self) -> &'static str {
        match self {
            ConfigError::Generic { category, .. } => category,
            ConfigError::Io { .. } => "Io",
            ConfigError::Toml { .. } => "Toml",
        }
    }
}

pub type ConfigErrorResult<T> = StdResult<T, ConfigError>;
