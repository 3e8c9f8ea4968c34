use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub sent: String,
}
