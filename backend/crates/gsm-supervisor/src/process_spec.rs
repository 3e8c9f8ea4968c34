use std::path::PathBuf;
use std::time::Duration;

/// Everything needed to launch and stop one child process.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub command: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Console line that asks the process to shut itself down
    pub stop_command: String,
    /// How long to wait for exit after a forced kill
    pub kill_timeout: Duration,
}
