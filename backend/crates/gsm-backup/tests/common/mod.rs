#![allow(dead_code)]

use gsm_backup::{BackupScheduler, BackupSettings, BackupStore};
use gsm_core::{Clock, ManualClock, ServerState};
use gsm_db::{BackupRepository, ScheduleRepository};
use gsm_supervisor::{LogBroadcaster, ProcessSpec, ServerSupervisor, SupervisorSettings};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

/// Console that acknowledges the save commands the store sends around an archive.
pub const FAKE_SERVER: &str = r#"
echo "Done (0.1s)!"
while IFS= read -r line; do
  case "$line" in
    stop) exit 0;;
    save-off) echo "Automatic saving is now disabled";;
    "save-all flush") echo "Saving the game (this may take a moment!)"; echo "Saved the game";;
    save-on) echo "Automatic saving is now enabled";;
    *) echo "got $line";;
  esac
done
"#;

pub struct TestEnv {
    pub temp: TempDir,
    pub clock: Arc<ManualClock>,
    pub supervisor: ServerSupervisor,
    pub store: BackupStore,
    pub scheduler: BackupScheduler,
    pub backups: BackupRepository,
    pub schedules: ScheduleRepository,
}

impl TestEnv {
    pub fn data_dir(&self) -> PathBuf {
        self.store.settings().data_dir.clone()
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.store.settings().backup_dir.clone()
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.clock.advance(by);
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

/// 12:00:30, half a minute before the next every-minute occurrence.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 30).unwrap()
}

pub async fn create_env() -> TestEnv {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let data_dir = temp.path().join("world");
    fs::create_dir_all(data_dir.join("region")).unwrap();
    fs::write(data_dir.join("level.dat"), b"original level").unwrap();
    fs::write(data_dir.join("region/r.0.0.mca"), vec![1u8; 2048]).unwrap();

    let script = temp.path().join("server.sh");
    fs::write(&script, FAKE_SERVER).unwrap();

    let clock = Arc::new(ManualClock::new(base_time()));
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

    let settings = BackupSettings {
        data_dir,
        backup_dir: temp.path().join("backups"),
        quiesce: true,
        save_off_command: "save-off".to_string(),
        save_all_command: "save-all flush".to_string(),
        save_on_command: "save-on".to_string(),
        save_complete_pattern: "Saved the game".to_string(),
        save_timeout: Duration::from_secs(5),
    };

    let pool = gsm_db::connect_in_memory()
        .await
        .expect("Failed to create test pool");
    let backups = BackupRepository::new(pool.clone());
    let schedules = ScheduleRepository::new(pool);

    let store = BackupStore::new(settings, backups.clone(), supervisor.clone(), clock.clone());
    let scheduler = BackupScheduler::new(store.clone(), schedules.clone(), clock.clone());

    TestEnv {
        temp,
        clock,
        supervisor,
        store,
        scheduler,
        backups,
        schedules,
    }
}

/// Names in `dir`, sorted.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub async fn wait_for_state(supervisor: &ServerSupervisor, state: ServerState) {
    let mut rx = supervisor.subscribe_state();
    let reached = tokio::time::timeout(Duration::from_secs(10), rx.wait_for(|s| *s == state))
        .await
        .is_ok_and(|r| r.is_ok());
    assert!(reached, "supervisor never reached {state}");
}
