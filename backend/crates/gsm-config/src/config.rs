use crate::{
    AuthConfig, BackupConfig, CONFIG_DIR_ENV, ConfigError, ConfigErrorResult, DEFAULT_CONFIG_DIR_NAME,
    DatabaseConfig, LoggingConfig, LogsConfig, ProcessConfig, ServerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub process: ProcessConfig,
    pub logs: LogsConfig,
    pub backup: BackupConfig,
}

impl Config {
    /// Load config.
    ///
    /// Loading order:
    /// 1. GSM_CONFIG_DIR env var, else ./.gsm/
    /// 2. Create the config directory if it doesn't exist
    /// 3. Parse config.toml if present, else defaults
    /// 4. Apply GSM_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join("config.toml");

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Priority: GSM_CONFIG_DIR env var > ./.gsm/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR_NAME))
    }

    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.database.validate()?;
        self.process.validate()?;
        self.logs.validate()?;
        self.backup.validate()?;

        let data_dir = self.backup_data_dir()?;
        let backup_dir = self.backup_dir()?;
        if backup_dir.starts_with(&data_dir) {
            return Err(ConfigError::backup(format!(
                "backup.backup_dir ({}) must not be inside the data directory ({})",
                backup_dir.display(),
                data_dir.display()
            )));
        }

        Ok(())
    }

    pub fn database_path(&self) -> ConfigErrorResult<PathBuf> {
        Ok(Self::config_dir()?.join(&self.database.path))
    }

    pub fn bind_addr(&self) -> String {
        self.server.bind_addr()
    }

    pub fn process_working_dir(&self) -> ConfigErrorResult<PathBuf> {
        Self::resolve(&self.process.working_dir)
    }

    pub fn backup_data_dir(&self) -> ConfigErrorResult<PathBuf> {
        match &self.backup.data_dir {
            Some(dir) => Self::resolve(dir),
            None => self.process_working_dir(),
        }
    }

    pub fn backup_dir(&self) -> ConfigErrorResult<PathBuf> {
        Self::resolve(&self.backup.backup_dir)
    }

    pub fn log_file_path(&self) -> ConfigErrorResult<Option<PathBuf>> {
        match &self.logging.file {
            Some(file) => Ok(Some(Self::resolve(&self.logging.dir)?.join(file))),
            None => Ok(None),
        }
    }

    /// Relative paths are anchored at the directory that holds the config dir.
    fn resolve(path: &str) -> ConfigErrorResult<PathBuf> {
        let path = Path::new(path);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }

        let config_dir = Self::config_dir()?;
        let base = match config_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()
                .map_err(|_| ConfigError::config("Cannot determine current working directory"))?,
        };
        Ok(base.join(path))
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (max {} connections)",
            self.server.host, self.server.port, self.server.max_connections
        );
        info!("  database: {}", self.database.path);
        info!("  auth: {}", self.auth.describe());
        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );
        info!(
            "  process: {} {} (cwd {})",
            self.process.command,
            self.process.args.join(" "),
            self.process.working_dir
        );
        info!(
            "  process timeouts: startup={}s, stop={}s, kill={}s, restart={}s",
            self.process.startup_timeout_secs,
            self.process.stop_timeout_secs,
            self.process.kill_timeout_secs,
            self.process.restart_timeout_secs
        );
        info!(
            "  logs: ring={}, subscriber_buffer={}",
            self.logs.ring_capacity, self.logs.subscriber_buffer
        );
        info!(
            "  backup: dir={}, scheduler={}, quiesce={}",
            self.backup.backup_dir, self.backup.scheduler_enabled, self.backup.quiesce
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("GSM_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("GSM_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse(
            "GSM_SERVER_MAX_CONNECTIONS",
            &mut self.server.max_connections,
        );

        // Database
        Self::apply_env_string("GSM_DATABASE_PATH", &mut self.database.path);

        // Auth
        Self::apply_env_bool("GSM_AUTH_ENABLED", &mut self.auth.enabled);

        // Logging
        Self::apply_env_parse("GSM_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("GSM_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("GSM_LOG_FILE", &mut self.logging.file);

        // Process
        Self::apply_env_string("GSM_PROCESS_COMMAND", &mut self.process.command);
        Self::apply_env_list("GSM_PROCESS_ARGS", &mut self.process.args);
        Self::apply_env_string("GSM_PROCESS_WORKING_DIR", &mut self.process.working_dir);
        Self::apply_env_string("GSM_PROCESS_STOP_COMMAND", &mut self.process.stop_command);
        Self::apply_env_string("GSM_PROCESS_READY_PATTERN", &mut self.process.ready_pattern);
        Self::apply_env_parse(
            "GSM_PROCESS_STARTUP_TIMEOUT_SECS",
            &mut self.process.startup_timeout_secs,
        );
        Self::apply_env_parse(
            "GSM_PROCESS_STOP_TIMEOUT_SECS",
            &mut self.process.stop_timeout_secs,
        );
        Self::apply_env_parse(
            "GSM_PROCESS_KILL_TIMEOUT_SECS",
            &mut self.process.kill_timeout_secs,
        );
        Self::apply_env_parse(
            "GSM_PROCESS_RESTART_TIMEOUT_SECS",
            &mut self.process.restart_timeout_secs,
        );

        // Logs
        Self::apply_env_parse("GSM_LOGS_RING_CAPACITY", &mut self.logs.ring_capacity);
        Self::apply_env_parse(
            "GSM_LOGS_SUBSCRIBER_BUFFER",
            &mut self.logs.subscriber_buffer,
        );

        // Backup
        Self::apply_env_option_string("GSM_BACKUP_DATA_DIR", &mut self.backup.data_dir);
        Self::apply_env_string("GSM_BACKUP_DIR", &mut self.backup.backup_dir);
        Self::apply_env_bool(
            "GSM_BACKUP_SCHEDULER_ENABLED",
            &mut self.backup.scheduler_enabled,
        );
        Self::apply_env_bool("GSM_BACKUP_QUIESCE", &mut self.backup.quiesce);
        Self::apply_env_parse(
            "GSM_BACKUP_SAVE_TIMEOUT_SECS",
            &mut self.backup.save_timeout_secs,
        );
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true"/"1"
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }

    /// Whitespace separated
    fn apply_env_list(var_name: &str, target: &mut Vec<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val.split_whitespace().map(str::to_string).collect();
        }
    }
}
