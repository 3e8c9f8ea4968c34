use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StopRequest {
    /// Console stop command when true, SIGTERM when false
    #[serde(default = "default_graceful")]
    pub graceful: bool,
}

impl Default for StopRequest {
    fn default() -> Self {
        Self { graceful: true }
    }
}

fn default_graceful() -> bool {
    true
}
