use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}
