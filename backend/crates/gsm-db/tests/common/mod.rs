#![allow(dead_code)]

use gsm_core::{BackupRecord, BackupType, ScheduleDefinition};

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

pub async fn create_test_pool() -> SqlitePool {
    gsm_db::connect_in_memory()
        .await
        .expect("Failed to create test pool")
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

pub fn create_test_backup(filename: &str, offset_secs: i64) -> BackupRecord {
    BackupRecord::new(
        filename.to_string(),
        BackupType::Manual,
        base_time() + Duration::seconds(offset_secs),
        1024,
        format!("test backup {filename}"),
    )
}

pub fn create_test_schedule(name: &str) -> ScheduleDefinition {
    ScheduleDefinition::new(name.to_string(), "*/5 * * * *".to_string(), true, base_time())
}
