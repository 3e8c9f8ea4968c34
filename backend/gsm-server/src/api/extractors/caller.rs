//! Capability checks for the REST API.
//!
//! The core crates assume the caller is already authorized; routes check the
//! caller's role here before invoking them.

use crate::{ApiError, AppState};

use std::fmt;
use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};

pub const ROLE_HEADER: &str = "X-User-Role";

/// Ordered: every role holds the capabilities of the roles below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    Viewer,
    Moderator,
    Admin,
}

impl Role {
    /// Unknown names map to the least privileged role.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "moderator" => Self::Moderator,
            _ => Self::Viewer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role of the caller making this request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Role);

impl Caller {
    #[track_caller]
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.0 >= role {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "{} role required, caller is {}",
                role, self.0
            )))
        }
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            if !state.auth_enabled {
                return Ok(Caller(Role::Admin));
            }

            let role = parts
                .headers
                .get(ROLE_HEADER)
                .and_then(|value| value.to_str().ok())
                .map(Role::parse)
                .unwrap_or(Role::Viewer);
            log::debug!("Request from {} caller", role);

            Ok(Caller(role))
        }
    }
}
