use crate::{Result as DbErrorResult, rows};

use gsm_core::ScheduleDefinition;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const TABLE: &str = "backup_schedules";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, cron_expression, backup_type, enabled,
           last_run_at, next_run_at, created_at, updated_at
    FROM backup_schedules
"#;

#[derive(Clone)]
pub struct ScheduleRepository {
    pool: SqlitePool,
}

impl ScheduleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or replace by id.
    pub async fn save(&self, schedule: &ScheduleDefinition) -> DbErrorResult<()> {
        sqlx::query(
            r#"
                INSERT INTO backup_schedules (
                    id, name, cron_expression, backup_type, enabled,
                    last_run_at, next_run_at, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    cron_expression = excluded.cron_expression,
                    backup_type = excluded.backup_type,
                    enabled = excluded.enabled,
                    last_run_at = excluded.last_run_at,
                    next_run_at = excluded.next_run_at,
                    updated_at = excluded.updated_at
            "#,
        )
        .bind(schedule.id.to_string())
        .bind(&schedule.name)
        .bind(&schedule.cron_expression)
        .bind(schedule.backup_type.as_str())
        .bind(schedule.enabled)
        .bind(schedule.last_run_at.map(|dt| dt.timestamp_millis()))
        .bind(schedule.next_run_at.map(|dt| dt.timestamp_millis()))
        .bind(schedule.created_at.timestamp_millis())
        .bind(schedule.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> DbErrorResult<Option<ScheduleDefinition>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    pub async fn find_all(&self) -> DbErrorResult<Vec<ScheduleDefinition>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY created_at ASC, rowid ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn find_enabled(&self) -> DbErrorResult<Vec<ScheduleDefinition>> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE enabled = 1 ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    pub async fn delete(&self, id: Uuid) -> DbErrorResult<bool> {
        let result = sqlx::query("DELETE FROM backup_schedules WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persist a fire. Touches only the run columns so a concurrent edit of the
    /// definition is not overwritten.
    pub async fn record_run(
        &self,
        id: Uuid,
        last_run_at: DateTime<Utc>,
        next_run_at: Option<DateTime<Utc>>,
    ) -> DbErrorResult<bool> {
        let result = sqlx::query(
            r#"
                UPDATE backup_schedules
                SET last_run_at = ?, next_run_at = ?
                WHERE id = ?
            "#,
        )
        .bind(last_run_at.timestamp_millis())
        .bind(next_run_at.map(|dt| dt.timestamp_millis()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &SqliteRow) -> DbErrorResult<ScheduleDefinition> {
        let id: String = row.try_get("id")?;
        let backup_type: String = row.try_get("backup_type")?;
        let last_run_at: Option<i64> = row.try_get("last_run_at")?;
        let next_run_at: Option<i64> = row.try_get("next_run_at")?;
        let created_at: i64 = row.try_get("created_at")?;
        let updated_at: i64 = row.try_get("updated_at")?;

        Ok(ScheduleDefinition {
            id: rows::uuid(TABLE, "id", &id)?,
            name: row.try_get("name")?,
            cron_expression: row.try_get("cron_expression")?,
            backup_type: rows::parsed(TABLE, "backup_type", &backup_type)?,
            enabled: row.try_get("enabled")?,
            last_run_at: last_run_at
                .map(|ms| rows::timestamp(TABLE, "last_run_at", ms))
                .transpose()?,
            next_run_at: next_run_at
                .map(|ms| rows::timestamp(TABLE, "next_run_at", ms))
                .transpose()?,
            created_at: rows::timestamp(TABLE, "created_at", created_at)?,
            updated_at: rows::timestamp(TABLE, "updated_at", updated_at)?,
        })
    }
}
