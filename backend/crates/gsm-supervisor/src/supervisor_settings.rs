use crate::ProcessSpec;

use gsm_config::ProcessConfig;

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub process: ProcessSpec,
    /// Empty means the server is ready as soon as it is spawned
    pub ready_pattern: String,
    pub startup_timeout: Duration,
    pub stop_timeout: Duration,
    pub restart_timeout: Duration,
}

impl SupervisorSettings {
    /// `working_dir` is passed in already resolved.
    pub fn from_config(config: &ProcessConfig, working_dir: PathBuf) -> Self {
        Self {
            process: ProcessSpec {
                command: config.command.clone(),
                args: config.args.clone(),
                working_dir,
                stop_command: config.stop_command.clone(),
                kill_timeout: config.kill_timeout(),
            },
            ready_pattern: config.ready_pattern.clone(),
            startup_timeout: config.startup_timeout(),
            stop_timeout: config.stop_timeout(),
            restart_timeout: config.restart_timeout(),
        }
    }
}
