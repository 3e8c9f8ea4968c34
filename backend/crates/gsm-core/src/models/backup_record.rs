use crate::BackupType;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata of one archive on disk. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackupRecord {
    pub id: Uuid,
    pub filename: String,
    pub backup_type: BackupType,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub description: String,
}

impl BackupRecord {
    pub fn new(
        filename: String,
        backup_type: BackupType,
        created_at: DateTime<Utc>,
        size_bytes: u64,
        description: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            backup_type,
            created_at,
            size_bytes,
            description,
        }
    }
}
