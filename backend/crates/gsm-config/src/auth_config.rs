use crate::DEFAULT_AUTH_ENABLED;

use serde::Deserialize;

/// `[auth]`: whether the API trusts the caller's role header.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Off makes every caller an admin.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    DEFAULT_AUTH_ENABLED
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: enabled_by_default(),
        }
    }
}

impl AuthConfig {
    pub fn describe(&self) -> &'static str {
        if self.enabled {
            "roles from request header"
        } else {
            "disabled, every caller is admin"
        }
    }
}
