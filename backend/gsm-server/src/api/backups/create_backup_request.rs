use gsm_core::BackupType;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CreateBackupRequest {
    /// Defaults to manual
    #[serde(rename = "type")]
    pub backup_type: Option<BackupType>,
    pub description: Option<String>,
}
