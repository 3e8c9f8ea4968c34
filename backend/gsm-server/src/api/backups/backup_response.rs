use crate::BackupDto;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub backup: BackupDto,
}
