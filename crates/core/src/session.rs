//! Durable session record and account roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role; the only input of route authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Jobseeker,
    Employer,
    Admin,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Jobseeker => "JOBSEEKER",
            Role::Employer => "EMPLOYER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOBSEEKER" => Ok(Role::Jobseeker),
            "EMPLOYER" => Ok(Role::Employer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The persisted half of a session. The access token is never part of it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub role: Role,
    pub name: String,
    pub email: String,
    pub refresh_token: String,
}

impl Session {
    /// Same session with a rotated refresh token
    pub fn with_refresh_token(self, refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            ..self
        }
    }

    /// Whether this session can be used for a refresh exchange
    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

// Keep the refresh token out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("role", &self.role)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
