use gsm_backup::ScheduleUpdate;

use serde::Deserialize;

/// Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub name: Option<String>,
    pub cron_expression: Option<String>,
    pub enabled: Option<bool>,
}

impl From<UpdateScheduleRequest> for ScheduleUpdate {
    fn from(r: UpdateScheduleRequest) -> Self {
        Self {
            name: r.name,
            cron_expression: r.cron_expression,
            enabled: r.enabled,
        }
    }
}
