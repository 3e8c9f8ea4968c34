#![allow(dead_code)]

use gsm_core::{ServerState, SystemClock};
use gsm_supervisor::{LogBroadcaster, ProcessSpec, ServerSupervisor, SupervisorSettings};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

/// Prints a banner, reports ready, then echoes console input until told to stop.
pub const FAKE_SERVER: &str = r#"
echo "Starting fake server"
echo "Done (0.1s)! For help, type \"help\""
while IFS= read -r line; do
  case "$line" in
    stop) echo "Stopping server"; exit 0;;
    crash) echo "boom" >&2; exit 3;;
    warn) echo "something odd" >&2;;
    join) echo "Steve joined the game";;
    *) echo "got $line";;
  esac
done
"#;

/// Reports ready but ignores both the stop command and SIGTERM.
pub const STUBBORN_SERVER: &str = r#"
trap '' TERM
echo "Done (0.1s)!"
while IFS= read -r line; do
  echo "ignoring $line"
done
"#;

/// Never prints the ready line.
pub const SLOW_SERVER: &str = r#"
echo "Loading world"
while IFS= read -r line; do
  :
done
"#;

/// Dies before reporting ready.
pub const BROKEN_SERVER: &str = r#"
echo "fatal: missing eula" >&2
exit 1
"#;

pub struct TestServer {
    pub dir: TempDir,
    pub supervisor: ServerSupervisor,
}

pub fn write_script(dir: &Path, body: &str) -> String {
    let path = dir.join("server.sh");
    std::fs::write(&path, body).expect("Failed to write fake server script");
    path.to_string_lossy().into_owned()
}

pub fn test_settings(dir: &Path, script: &str) -> SupervisorSettings {
    SupervisorSettings {
        process: ProcessSpec {
            command: "/bin/sh".to_string(),
            args: vec![script.to_string()],
            working_dir: dir.to_path_buf(),
            stop_command: "stop".to_string(),
            kill_timeout: Duration::from_secs(2),
        },
        ready_pattern: "Done (".to_string(),
        startup_timeout: Duration::from_secs(5),
        stop_timeout: Duration::from_secs(2),
        restart_timeout: Duration::from_secs(5),
    }
}

pub fn create_supervisor(body: &str) -> TestServer {
    create_supervisor_with(body, |_| {})
}

pub fn create_supervisor_with(body: &str, adjust: impl FnOnce(&mut SupervisorSettings)) -> TestServer {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let script = write_script(dir.path(), body);
    let mut settings = test_settings(dir.path(), &script);
    adjust(&mut settings);

    let supervisor = ServerSupervisor::new(
        settings,
        LogBroadcaster::new(100, 64),
        Arc::new(SystemClock),
    );
    TestServer { dir, supervisor }
}

/// Wait (bounded) for the supervisor to reach `state`.
pub async fn wait_for_state(supervisor: &ServerSupervisor, state: ServerState) {
    let mut rx = supervisor.subscribe_state();
    let reached = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| *s == state))
        .await
        .is_ok_and(|r| r.is_ok());
    assert!(reached, "supervisor never reached {state}, still {}", supervisor.state());
}

/// Wait (bounded) until the broadcaster's backlog has a line containing `needle`.
pub async fn wait_for_line(supervisor: &ServerSupervisor, needle: &str) -> gsm_core::LogLine {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(line) = supervisor
            .broadcaster()
            .backlog()
            .into_iter()
            .find(|line| line.text.contains(needle))
        {
            return line;
        }
        assert!(tokio::time::Instant::now() < deadline, "no line containing '{needle}'");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
