use gsm_config::BackupConfig;

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackupSettings {
    /// Directory that is archived and replaced on restore
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub quiesce: bool,
    pub save_off_command: String,
    pub save_all_command: String,
    pub save_on_command: String,
    pub save_complete_pattern: String,
    pub save_timeout: Duration,
}

impl BackupSettings {
    /// Both directories are passed in already resolved.
    pub fn from_config(config: &BackupConfig, data_dir: PathBuf, backup_dir: PathBuf) -> Self {
        Self {
            data_dir,
            backup_dir,
            quiesce: config.quiesce,
            save_off_command: config.save_off_command.clone(),
            save_all_command: config.save_all_command.clone(),
            save_on_command: config.save_on_command.clone(),
            save_complete_pattern: config.save_complete_pattern.clone(),
            save_timeout: config.save_timeout(),
        }
    }
}
