use thiserror::Error;

/// Startup failures of the manager binary.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Config error: {0}")]
    Config(#[from] gsm_config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] gsm_db::DbError),

    #[error("Failed to initialize logger: {message}")]
    Logger { message: String },

    #[error("Failed to install metrics recorder: {message}")]
    Metrics { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
