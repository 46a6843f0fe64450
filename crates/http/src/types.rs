//! Wire types of the authentication endpoints

use jobhub_core::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign-in request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Sign-up request; the API answers by mailing a one-time password
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Sign-up response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignUpResponse {
    #[serde(default)]
    pub message: String,
}

/// OTP verification completing a sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// Refresh exchange request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token grant returned by sign-in, OTP verification and refresh
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub role: Role,
    pub name: String,
    pub email: String,
}

/// The refresh endpoint answers with the same grant shape
pub type RefreshResponse = AuthResponse;

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
