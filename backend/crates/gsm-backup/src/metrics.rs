use gsm_core::BackupType;

use metrics::counter;

/// Metrics collector for backups, restores and scheduled fires.
#[derive(Clone)]
pub struct BackupMetrics {
    prefix: &'static str,
}

impl BackupMetrics {
    pub fn new() -> Self {
        Self {
            prefix: "gsm_backup",
        }
    }

    pub fn created(&self, backup_type: BackupType, size_bytes: u64) {
        counter!(format!("{}.created.{}", self.prefix, backup_type.as_str())).increment(1);
        counter!(format!("{}.bytes_written", self.prefix)).increment(size_bytes);
    }

    pub fn failed(&self) {
        counter!(format!("{}.failed", self.prefix)).increment(1);
    }

    pub fn restored(&self) {
        counter!(format!("{}.restores", self.prefix)).increment(1);
    }

    pub fn restore_failed(&self) {
        counter!(format!("{}.restores_failed", self.prefix)).increment(1);
    }

    pub fn deleted(&self) {
        counter!(format!("{}.deleted", self.prefix)).increment(1);
    }

    pub fn scheduled_fired(&self) {
        counter!(format!("{}.scheduler.fired", self.prefix)).increment(1);
    }

    pub fn scheduled_skipped(&self) {
        counter!(format!("{}.scheduler.skipped", self.prefix)).increment(1);
    }
}

impl Default for BackupMetrics {
    fn default() -> Self {
        Self::new()
    }
}
