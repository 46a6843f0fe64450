//! Endpoint configuration for the API client

use serde::{Deserialize, Serialize};

/// Paths of the authentication endpoints and the pipeline exemptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub sign_in_path: String,
    pub sign_up_path: String,
    pub verify_otp_path: String,
    pub refresh_path: String,
    /// Extra paths that never carry the access token, on top of
    /// `verify_otp_path`
    pub exempt_paths: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sign_in_path: "/auth/signin".to_string(),
            sign_up_path: "/auth/signup".to_string(),
            verify_otp_path: "/auth/verify-otp".to_string(),
            refresh_path: "/auth/refresh-token".to_string(),
            exempt_paths: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Whether a request to `path` must go out without the access token
    pub fn is_exempt(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or(path);
        path == self.verify_otp_path || self.exempt_paths.iter().any(|exempt| exempt == path)
    }
}
