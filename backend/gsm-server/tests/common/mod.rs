#![allow(dead_code)]

//! Test infrastructure for gsm-server API tests

use gsm_backup::{BackupScheduler, BackupSettings, BackupStore};
use gsm_core::{Clock, ServerState, SystemClock};
use gsm_db::{BackupRepository, ScheduleRepository};
use gsm_server::{AppState, ROLE_HEADER};
use gsm_supervisor::{
    LogBroadcaster, ProcessSpec, ServerSupervisor, ShutdownCoordinator, SupervisorSettings,
};

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

/// Console that prints a ready line, echoes input and acknowledges saves.
pub const FAKE_SERVER: &str = r#"
echo "Done (0.1s)!"
while IFS= read -r line; do
  case "$line" in
    stop) exit 0;;
    "save-all flush") echo "Saved the game";;
    save-off|save-on) ;;
    *) echo "got $line";;
  esac
done
"#;

pub struct TestApp {
    pub temp: TempDir,
    pub state: AppState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        gsm_server::build_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.unwrap()
    }
}

/// App with authorization enforced, so tests pick the caller's role.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_auth(true).await
}

pub async fn create_test_app_with_auth(auth_enabled: bool) -> TestApp {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let data_dir = temp.path().join("world");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("level.dat"), b"level").unwrap();

    let script = temp.path().join("server.sh");
    fs::write(&script, FAKE_SERVER).unwrap();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let supervisor = ServerSupervisor::new(
        SupervisorSettings {
            process: ProcessSpec {
                command: "/bin/sh".to_string(),
                args: vec![script.to_string_lossy().into_owned()],
                working_dir: temp.path().to_path_buf(),
                stop_command: "stop".to_string(),
                kill_timeout: Duration::from_secs(2),
            },
            ready_pattern: "Done (".to_string(),
            startup_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(2),
            restart_timeout: Duration::from_secs(5),
        },
        LogBroadcaster::new(100, 64),
        clock.clone(),
    );

    let pool = gsm_db::connect_in_memory()
        .await
        .expect("Failed to create test database");

    let store = BackupStore::new(
        BackupSettings {
            data_dir,
            backup_dir: temp.path().join("backups"),
            quiesce: true,
            save_off_command: "save-off".to_string(),
            save_all_command: "save-all flush".to_string(),
            save_on_command: "save-on".to_string(),
            save_complete_pattern: "Saved the game".to_string(),
            save_timeout: Duration::from_secs(5),
        },
        BackupRepository::new(pool.clone()),
        supervisor.clone(),
        clock.clone(),
    );
    let scheduler = BackupScheduler::new(store.clone(), ScheduleRepository::new(pool.clone()), clock);

    TestApp {
        temp,
        state: AppState {
            supervisor,
            store,
            scheduler,
            pool,
            auth_enabled,
            shutdown: ShutdownCoordinator::new(),
            metrics: None,
        },
    }
}

pub fn request(method: &str, uri: &str, role: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ROLE_HEADER, role)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, role: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ROLE_HEADER, role)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn wait_for_state(supervisor: &ServerSupervisor, state: ServerState) {
    let mut rx = supervisor.subscribe_state();
    let reached = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| *s == state))
        .await
        .is_ok_and(|r| r.is_ok());
    assert!(reached, "supervisor never reached {state}");
}
