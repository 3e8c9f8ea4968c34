mod auth_config;
mod backup_config;
mod config;
mod database_config;
mod error;
mod log_level;
mod logging_config;
mod logs_config;
mod process_config;
mod server_config;

#[cfg(test)]
mod tests;

pub use auth_config::AuthConfig;
pub use backup_config::BackupConfig;
pub use config::Config;
pub use database_config::DatabaseConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use logs_config::LogsConfig;
pub use process_config::ProcessConfig;
pub use server_config::ServerConfig;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_FILENAME: &str = "gsm.db";
const DEFAULT_AUTH_ENABLED: bool = false;
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
const DEFAULT_LOG_COLORED: bool = true;

// Server connection limits
const DEFAULT_MAX_CONNECTIONS: usize = 256;
const MIN_MAX_CONNECTIONS: usize = 1;
const MAX_MAX_CONNECTIONS: usize = 100_000;
const MIN_PORT: u16 = 1024;

const CONFIG_DIR_ENV: &str = "GSM_CONFIG_DIR";
const DEFAULT_CONFIG_DIR_NAME: &str = ".gsm";
