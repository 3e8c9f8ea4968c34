use gsm_core::ScheduleDefinition;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScheduleDto {
    pub id: String,
    pub name: String,
    pub cron_expression: String,
    pub backup_type: String,
    pub enabled: bool,
    pub last_run_at: Option<String>,
    pub next_run_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ScheduleDefinition> for ScheduleDto {
    fn from(s: ScheduleDefinition) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name,
            cron_expression: s.cron_expression,
            backup_type: s.backup_type.as_str().to_string(),
            enabled: s.enabled,
            last_run_at: s.last_run_at.map(|t| t.to_rfc3339()),
            next_run_at: s.next_run_at.map(|t| t.to_rfc3339()),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}
