use crate::{BackupError, Result as BackupResult};

use chrono::{DateTime, Utc};
use croner::Cron;

/// A parsed cron expression: five fields, or six with leading seconds.
pub struct CronSchedule {
    expression: String,
    cron: Cron,
}

impl CronSchedule {
    #[track_caller]
    pub fn parse(expression: &str) -> BackupResult<Self> {
        let expression = expression.trim();
        let cron = Cron::new(expression)
            .with_seconds_optional()
            .parse()
            .map_err(|e| {
                BackupError::invalid_schedule(format!(
                    "invalid cron expression '{}': {}",
                    expression, e
                ))
            })?;

        Ok(Self {
            expression: expression.to_string(),
            cron,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First occurrence strictly after `after`, or `None` if there is none.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.cron.find_next_occurrence(&after, false).ok()
    }
}
