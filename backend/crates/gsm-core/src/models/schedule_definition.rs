use crate::{BackupType, CoreError, CoreResult};

use std::panic::Location;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_SCHEDULE_NAME_LENGTH: usize = 100;

/// A recurring backup rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleDefinition {
    pub id: Uuid,
    pub name: String,
    pub cron_expression: String,
    pub backup_type: BackupType,
    pub enabled: bool,

    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,

    // Audit
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleDefinition {
    pub fn new(
        name: String,
        cron_expression: String,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            cron_expression,
            backup_type: BackupType::Scheduled,
            enabled,
            last_run_at: None,
            next_run_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Field-level checks that don't need a cron parser.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.len() > MAX_SCHEDULE_NAME_LENGTH {
            return Err(CoreError::Validation {
                message: format!("name must be 1-{MAX_SCHEDULE_NAME_LENGTH} characters"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.cron_expression.split_whitespace().count() < 5 {
            return Err(CoreError::Validation {
                message: format!(
                    "cron_expression '{}' must have at least 5 fields",
                    self.cron_expression
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }
}
