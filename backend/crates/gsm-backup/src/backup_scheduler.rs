//! Cron-driven scheduled backups.

use crate::{
    BackupError, BackupMetrics, BackupStore, CronSchedule, MAX_SCHEDULER_SLEEP_SECS,
    Result as BackupResult, SCHEDULER_ERROR_BACKOFF_SECS,
};

use gsm_core::{BackupRecord, BackupType, Clock, ScheduleDefinition};
use gsm_db::ScheduleRepository;
use gsm_supervisor::ShutdownGuard;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Fields of a schedule that can be changed after creation.
#[derive(Debug, Clone, Default)]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub cron_expression: Option<String>,
    pub enabled: Option<bool>,
}

/// Fires `BackupStore::create(Scheduled)` for every enabled schedule when due.
///
/// A single loop sleeps until the earliest `next_run_at` across enabled
/// schedules. Each schedule fires at most once per due occurrence: missed
/// occurrences are coalesced into one fire, and the next due time is the first
/// occurrence strictly after the fire. A `last_run_at` at or after the due
/// time suppresses the fire. Failed fires wait for the next occurrence.
#[derive(Clone)]
pub struct BackupScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    store: BackupStore,
    repository: ScheduleRepository,
    clock: Arc<dyn Clock>,
    wake: Notify,
    metrics: BackupMetrics,
}

impl BackupScheduler {
    pub fn new(store: BackupStore, repository: ScheduleRepository, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                store,
                repository,
                clock,
                wake: Notify::new(),
                metrics: BackupMetrics::new(),
            }),
        }
    }

    pub async fn list_schedules(&self) -> BackupResult<Vec<ScheduleDefinition>> {
        Ok(self.inner.repository.find_all().await?)
    }

    pub async fn get_schedule(&self, id: Uuid) -> BackupResult<ScheduleDefinition> {
        self.inner
            .repository
            .find(id)
            .await?
            .ok_or_else(|| BackupError::schedule_not_found(id))
    }

    pub async fn create_schedule(
        &self,
        name: &str,
        cron_expression: &str,
        enabled: bool,
    ) -> BackupResult<ScheduleDefinition> {
        let now = self.inner.clock.now();
        let mut schedule = ScheduleDefinition::new(
            name.trim().to_string(),
            cron_expression.trim().to_string(),
            enabled,
            now,
        );
        let cron = validate(&schedule)?;
        schedule.next_run_at = if enabled { cron.next_after(now) } else { None };

        self.inner.repository.save(&schedule).await?;
        info!(
            "Created backup schedule '{}' ({}), next run {:?}",
            schedule.name, schedule.cron_expression, schedule.next_run_at
        );
        self.notify();
        Ok(schedule)
    }

    pub async fn update_schedule(
        &self,
        id: Uuid,
        update: ScheduleUpdate,
    ) -> BackupResult<ScheduleDefinition> {
        let mut schedule = self.get_schedule(id).await?;
        let now = self.inner.clock.now();

        if let Some(name) = update.name {
            schedule.name = name.trim().to_string();
        }
        if let Some(cron_expression) = update.cron_expression {
            schedule.cron_expression = cron_expression.trim().to_string();
        }
        if let Some(enabled) = update.enabled {
            schedule.enabled = enabled;
        }

        let cron = validate(&schedule)?;
        schedule.next_run_at = if schedule.enabled {
            cron.next_after(now)
        } else {
            None
        };
        schedule.updated_at = now;

        self.inner.repository.save(&schedule).await?;
        info!(
            "Updated backup schedule '{}' (enabled: {}, next run {:?})",
            schedule.name, schedule.enabled, schedule.next_run_at
        );
        self.notify();
        Ok(schedule)
    }

    pub async fn delete_schedule(&self, id: Uuid) -> BackupResult<()> {
        if !self.inner.repository.delete(id).await? {
            return Err(BackupError::schedule_not_found(id));
        }
        info!("Deleted backup schedule {}", id);
        self.notify();
        Ok(())
    }

    /// Wake the loop so it re-reads the active schedules.
    pub fn notify(&self) {
        self.inner.wake.notify_one();
    }

    /// Fire every enabled schedule that is due at the clock's current time.
    ///
    /// Returns the records created by this pass and the earliest upcoming due
    /// time across enabled schedules.
    pub async fn run_pending(
        &self,
    ) -> BackupResult<(Vec<BackupRecord>, Option<DateTime<Utc>>)> {
        let now = self.inner.clock.now();
        let schedules = self.inner.repository.find_enabled().await?;

        let mut created = Vec::new();
        let mut next_wake: Option<DateTime<Utc>> = None;

        for schedule in schedules {
            let cron = match CronSchedule::parse(&schedule.cron_expression) {
                Ok(cron) => cron,
                Err(e) => {
                    warn!("Skipping schedule '{}': {}", schedule.name, e);
                    continue;
                }
            };

            let due = schedule.next_run_at.or_else(|| {
                cron.next_after(schedule.last_run_at.unwrap_or(schedule.updated_at))
            });
            let Some(due) = due else {
                debug!("Schedule '{}' has no upcoming occurrence", schedule.name);
                continue;
            };

            if due > now {
                next_wake = earliest(next_wake, Some(due));
                continue;
            }

            let next = cron.next_after(now);
            if schedule.last_run_at.is_some_and(|last| last >= due) {
                debug!("Schedule '{}' already ran for {}, skipping", schedule.name, due);
                self.inner.metrics.scheduled_skipped();
                if let Some(last) = schedule.last_run_at {
                    self.inner.repository.record_run(schedule.id, last, next).await?;
                }
            } else if let Some(record) = self.fire(schedule.id, now, next).await? {
                created.push(record);
            }

            next_wake = earliest(next_wake, next);
        }

        Ok((created, next_wake))
    }

    /// Start the loop on the runtime. It exits when `shutdown` fires.
    pub fn spawn(&self, shutdown: ShutdownGuard) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run(shutdown).await })
    }

    pub async fn run(&self, mut shutdown: ShutdownGuard) {
        info!("Backup scheduler started");

        loop {
            let sleep_for = match self.run_pending().await {
                Ok((_, Some(next))) => (next - self.inner.clock.now())
                    .to_std()
                    .unwrap_or(Duration::ZERO)
                    .min(Duration::from_secs(MAX_SCHEDULER_SLEEP_SECS)),
                Ok((_, None)) => Duration::from_secs(MAX_SCHEDULER_SLEEP_SECS),
                Err(e) => {
                    error!("Backup scheduler pass failed: {}", e);
                    Duration::from_secs(SCHEDULER_ERROR_BACKOFF_SECS)
                }
            };
            debug!("Backup scheduler sleeping for {:?}", sleep_for);

            tokio::select! {
                _ = shutdown.wait() => break,
                _ = self.inner.wake.notified() => debug!("Backup schedules changed"),
                _ = tokio::time::sleep(sleep_for) => {}
            }
        }

        info!("Backup scheduler stopped");
    }

    /// Re-check the schedule, then create the backup. A schedule deleted or
    /// disabled since it was read is skipped silently.
    async fn fire(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
        next: Option<DateTime<Utc>>,
    ) -> BackupResult<Option<BackupRecord>> {
        let Some(schedule) = self.inner.repository.find(id).await? else {
            self.inner.metrics.scheduled_skipped();
            return Ok(None);
        };
        if !schedule.enabled {
            self.inner.metrics.scheduled_skipped();
            return Ok(None);
        }

        self.inner.metrics.scheduled_fired();
        let description = format!("Scheduled backup: {}", schedule.name);
        let result = self
            .inner
            .store
            .create(BackupType::Scheduled, description)
            .await;

        self.inner.repository.record_run(id, now, next).await?;

        match result {
            Ok(record) => {
                info!("Schedule '{}' created {}", schedule.name, record.filename);
                Ok(Some(record))
            }
            Err(e) => {
                warn!(
                    "Schedule '{}' failed, next attempt at {:?}: {}",
                    schedule.name, next, e
                );
                Ok(None)
            }
        }
    }
}

/// Field checks plus a cron parse.
fn validate(schedule: &ScheduleDefinition) -> BackupResult<CronSchedule> {
    schedule
        .validate()
        .map_err(|e| BackupError::invalid_schedule(e.to_string()))?;
    CronSchedule::parse(&schedule.cron_expression)
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
