use gsm_core::ServerStatus;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: ServerStatus,
}
