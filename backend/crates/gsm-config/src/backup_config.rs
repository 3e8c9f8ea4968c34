use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_SAVE_OFF_COMMAND: &str = "save-off";
pub const DEFAULT_SAVE_ALL_COMMAND: &str = "save-all flush";
pub const DEFAULT_SAVE_ON_COMMAND: &str = "save-on";
pub const DEFAULT_SAVE_COMPLETE_PATTERN: &str = "Saved the game";

pub const MIN_SAVE_TIMEOUT_SECS: u64 = 1;
pub const MAX_SAVE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_SAVE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Directory that gets archived; `process.working_dir` when unset
    pub data_dir: Option<String>,
    pub backup_dir: String,
    pub scheduler_enabled: bool,
    /// Pause world saves around archiving while the server runs
    pub quiesce: bool,
    pub save_off_command: String,
    pub save_all_command: String,
    pub save_on_command: String,
    pub save_complete_pattern: String,
    pub save_timeout_secs: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            backup_dir: String::from(DEFAULT_BACKUP_DIR),
            scheduler_enabled: true,
            quiesce: true,
            save_off_command: String::from(DEFAULT_SAVE_OFF_COMMAND),
            save_all_command: String::from(DEFAULT_SAVE_ALL_COMMAND),
            save_on_command: String::from(DEFAULT_SAVE_ON_COMMAND),
            save_complete_pattern: String::from(DEFAULT_SAVE_COMPLETE_PATTERN),
            save_timeout_secs: DEFAULT_SAVE_TIMEOUT_SECS,
        }
    }
}

impl BackupConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.backup_dir.trim().is_empty() {
            return Err(ConfigError::backup("backup.backup_dir cannot be empty"));
        }

        if self.save_timeout_secs < MIN_SAVE_TIMEOUT_SECS
            || self.save_timeout_secs > MAX_SAVE_TIMEOUT_SECS
        {
            return Err(ConfigError::backup(format!(
                "backup.save_timeout_secs must be {}-{}, got {}",
                MIN_SAVE_TIMEOUT_SECS, MAX_SAVE_TIMEOUT_SECS, self.save_timeout_secs
            )));
        }

        if self.quiesce
            && (self.save_off_command.trim().is_empty() || self.save_on_command.trim().is_empty())
        {
            return Err(ConfigError::backup(
                "backup.save_off_command and backup.save_on_command are required when quiesce is enabled",
            ));
        }

        Ok(())
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_secs(self.save_timeout_secs)
    }
}
