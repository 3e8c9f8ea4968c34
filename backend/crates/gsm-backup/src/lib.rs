mod archive;
mod backup_scheduler;
mod backup_settings;
mod backup_store;
mod cron_schedule;
mod error;
mod metrics;


pub use archive::{extract_archive, write_archive};
pub use backup_scheduler::{BackupScheduler, ScheduleUpdate};
pub use backup_settings::BackupSettings;
pub use backup_store::{BackupDownload, BackupOperationGuard, BackupStore};
pub use cron_schedule::CronSchedule;
pub use error::{BackupError, Result};
pub use metrics::BackupMetrics;

/// Longest the scheduler sleeps before re-reading the wall clock.
pub const MAX_SCHEDULER_SLEEP_SECS: u64 = 300;

/// Retry delay after the scheduler failed to read its schedules.
pub const SCHEDULER_ERROR_BACKOFF_SECS: u64 = 60;
