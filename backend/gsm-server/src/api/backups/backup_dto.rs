use gsm_core::BackupRecord;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BackupDto {
    pub id: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub backup_type: String,
    pub created_at: String,
    pub size_bytes: u64,
    pub description: String,
}

impl From<BackupRecord> for BackupDto {
    fn from(b: BackupRecord) -> Self {
        Self {
            id: b.id.to_string(),
            filename: b.filename,
            backup_type: b.backup_type.as_str().to_string(),
            created_at: b.created_at.to_rfc3339(),
            size_bytes: b.size_bytes,
            description: b.description,
        }
    }
}
