use crate::BackupDto;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BackupListResponse {
    pub backups: Vec<BackupDto>,
}
