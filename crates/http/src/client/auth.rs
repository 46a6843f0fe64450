//! Authentication endpoints

use super::error::ClientError;
use super::pipeline::ApiRequest;
use super::{ApiClient, SessionClient};
use crate::types::{
    AuthResponse, RefreshRequest, RefreshResponse, SignInRequest, SignUpRequest, SignUpResponse,
    VerifyOtpRequest,
};
use jobhub_core::Session;
use reqwest::Method;

impl ApiClient {
    /// Exchange a refresh token for a new token pair
    ///
    /// A single call with no side effects; storing the result is up to the
    /// caller.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let request = self
            .request(Method::POST, &self.config().refresh_path)
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            });
        self.execute(request).await
    }
}

impl SessionClient {
    /// Sign in and store the resulting session
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<Session, ClientError> {
        let path = &self.api().config().sign_in_path;
        let grant: AuthResponse = self.execute(&ApiRequest::post(path).json(request)?).await?;
        self.establish(&grant)
    }

    /// Start a sign-up; the API mails a one-time password
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ClientError> {
        let path = &self.api().config().sign_up_path;
        self.execute(&ApiRequest::post(path).json(request)?).await
    }

    /// Complete a sign-up with its one-time password and store the session
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Session, ClientError> {
        let path = &self.api().config().verify_otp_path;
        let grant: AuthResponse = self.execute(&ApiRequest::post(path).json(request)?).await?;
        self.establish(&grant)
    }
}
