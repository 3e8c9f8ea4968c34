use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_COMMAND: &str = "java";
pub const DEFAULT_ARGS: [&str; 5] = ["-Xms1G", "-Xmx2G", "-jar", "server.jar", "nogui"];
pub const DEFAULT_WORKING_DIR: &str = "server";
pub const DEFAULT_STOP_COMMAND: &str = "stop";
pub const DEFAULT_READY_PATTERN: &str = "Done (";

// Startup timeout constraints (seconds)
pub const MIN_STARTUP_TIMEOUT_SECS: u64 = 1;
pub const MAX_STARTUP_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 120;

// Graceful stop timeout constraints (seconds)
pub const MIN_STOP_TIMEOUT_SECS: u64 = 1;
pub const MAX_STOP_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 30;

// Wait after SIGKILL before giving up (seconds)
pub const MIN_KILL_TIMEOUT_SECS: u64 = 1;
pub const MAX_KILL_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_KILL_TIMEOUT_SECS: u64 = 10;

// Bound on the stop half of a restart (seconds)
pub const MIN_RESTART_TIMEOUT_SECS: u64 = 1;
pub const MAX_RESTART_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_RESTART_TIMEOUT_SECS: u64 = 60;

/// How the game server child process is launched and stopped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: String,
    /// Console line written to stdin for a graceful stop
    pub stop_command: String,
    /// Substring of a console line that marks the server ready (empty = ready on spawn)
    pub ready_pattern: String,
    pub startup_timeout_secs: u64,
    pub stop_timeout_secs: u64,
    pub kill_timeout_secs: u64,
    pub restart_timeout_secs: u64,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            command: String::from(DEFAULT_COMMAND),
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            working_dir: String::from(DEFAULT_WORKING_DIR),
            stop_command: String::from(DEFAULT_STOP_COMMAND),
            ready_pattern: String::from(DEFAULT_READY_PATTERN),
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
            kill_timeout_secs: DEFAULT_KILL_TIMEOUT_SECS,
            restart_timeout_secs: DEFAULT_RESTART_TIMEOUT_SECS,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::process("process.command cannot be empty"));
        }

        if self.working_dir.trim().is_empty() {
            return Err(ConfigError::process("process.working_dir cannot be empty"));
        }

        if self.stop_command.trim().is_empty() {
            return Err(ConfigError::process("process.stop_command cannot be empty"));
        }

        Self::check_range(
            "startup_timeout_secs",
            self.startup_timeout_secs,
            MIN_STARTUP_TIMEOUT_SECS,
            MAX_STARTUP_TIMEOUT_SECS,
        )?;
        Self::check_range(
            "stop_timeout_secs",
            self.stop_timeout_secs,
            MIN_STOP_TIMEOUT_SECS,
            MAX_STOP_TIMEOUT_SECS,
        )?;
        Self::check_range(
            "kill_timeout_secs",
            self.kill_timeout_secs,
            MIN_KILL_TIMEOUT_SECS,
            MAX_KILL_TIMEOUT_SECS,
        )?;
        Self::check_range(
            "restart_timeout_secs",
            self.restart_timeout_secs,
            MIN_RESTART_TIMEOUT_SECS,
            MAX_RESTART_TIMEOUT_SECS,
        )?;

        Ok(())
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    pub fn kill_timeout(&self) -> Duration {
        Duration::from_secs(self.kill_timeout_secs)
    }

    pub fn restart_timeout(&self) -> Duration {
        Duration::from_secs(self.restart_timeout_secs)
    }

    fn check_range(field: &str, value: u64, min: u64, max: u64) -> ConfigErrorResult<()> {
        if value < min || value > max {
            return Err(ConfigError::process(format!(
                "process.{field} must be {min}-{max}, got {value}"
            )));
        }
        Ok(())
    }
}
