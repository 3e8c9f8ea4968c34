use crate::{Result as DbErrorResult, rows};

use gsm_core::BackupRecord;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

const TABLE: &str = "backups";

#[derive(Clone)]
pub struct BackupRepository {
    pool: SqlitePool,
}

impl BackupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, record: &BackupRecord) -> DbErrorResult<()> {
        let size_bytes = i64::try_from(record.size_bytes).unwrap_or(i64::MAX);

        sqlx::query(
            r#"
                INSERT INTO backups (id, filename, backup_type, created_at, size_bytes, description)
                VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.filename)
        .bind(record.backup_type.as_str())
        .bind(record.created_at.timestamp_millis())
        .bind(size_bytes)
        .bind(&record.description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find(&self, id: Uuid) -> DbErrorResult<Option<BackupRecord>> {
        let row = sqlx::query(
            r#"
                SELECT id, filename, backup_type, created_at, size_bytes, description
                FROM backups
                WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    /// Newest first. Records created in the same millisecond keep insertion order, newest first.
    pub async fn find_all(&self) -> DbErrorResult<Vec<BackupRecord>> {
        let rows = sqlx::query(
            r#"
                SELECT id, filename, backup_type, created_at, size_bytes, description
                FROM backups
                ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> DbErrorResult<bool> {
        let result = sqlx::query("DELETE FROM backups WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    fn from_row(row: &SqliteRow) -> DbErrorResult<BackupRecord> {
        let id: String = row.try_get("id")?;
        let backup_type: String = row.try_get("backup_type")?;
        let created_at: i64 = row.try_get("created_at")?;
        let size_bytes: i64 = row.try_get("size_bytes")?;

        Ok(BackupRecord {
            id: rows::uuid(TABLE, "id", &id)?,
            filename: row.try_get("filename")?,
            backup_type: rows::parsed(TABLE, "backup_type", &backup_type)?,
            created_at: rows::timestamp(TABLE, "created_at", created_at)?,
            size_bytes: rows::size(TABLE, "size_bytes", size_bytes)?,
            description: row.try_get("description")?,
        })
    }
}
