//! Session-aware client: the single chokepoint for API calls
//!
//! Outbound requests carry the in-memory access token as a raw
//! `Authorization` value. A 410 response triggers one refresh exchange and
//! one re-issue of the request; a 401, a failed refresh or a second stale
//! response ends the session and sends the app to sign-in.

use super::error::ClientError;
use super::pipeline::{
    ApiRequest, Attempt, Outcome, TerminationReason, authorization_for, classify,
};
use super::{ApiClient, decode_response};
use crate::types::AuthResponse;
use jobhub_core::{AuthConfig, CredentialStore, Navigator, Session, TokenHolder};
use reqwest::header;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared session state of one app instance
#[derive(Clone)]
pub struct SessionContext {
    pub credentials: CredentialStore,
    pub tokens: TokenHolder,
    pub navigator: Arc<dyn Navigator>,
}

impl SessionContext {
    pub fn new(
        credentials: CredentialStore,
        tokens: TokenHolder,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            navigator,
        }
    }
}

/// API client that owns the token lifecycle
#[derive(Clone)]
pub struct SessionClient {
    api: ApiClient,
    context: SessionContext,
}

impl SessionClient {
    pub fn new(api: ApiClient, context: SessionContext) -> Self {
        Self { api, context }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Send a request through the pipeline
    ///
    /// Statuses other than 401 and 410 come back unchanged, error statuses
    /// included. A torn down session is reported as
    /// [`ClientError::SessionTerminated`] after the teardown has happened.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let mut attempt = Attempt::FIRST;
        loop {
            let response = self.dispatch(request, attempt).await?;

            match classify(response.status(), attempt) {
                Outcome::Deliver => return Ok(response),
                Outcome::Terminate(reason) => return Err(self.terminate(reason)),
                Outcome::Refresh => {
                    let Some(session) = self
                        .context
                        .credentials
                        .get()
                        .filter(Session::has_refresh_token)
                    else {
                        debug!(path = %request.path, "Stale credential without a stored session");
                        return Ok(response);
                    };

                    if let Err(e) = self.renew(session).await {
                        warn!(path = %request.path, "Refresh exchange failed: {e}");
                        return Err(self.terminate(TerminationReason::RefreshFailed));
                    }
                    attempt = attempt.next();
                }
            }
        }
    }

    /// Send a request and decode a successful JSON body
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        decode_response(response).await
    }

    /// Send a request whose response body is irrelevant
    pub async fn execute_empty(&self, request: &ApiRequest) -> Result<(), ClientError> {
        let response = self.send(request).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(&ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(&ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(&ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute_empty(&ApiRequest::delete(path)).await
    }

    /// Store a fresh grant from sign-in or OTP verification
    pub fn establish(&self, grant: &AuthResponse) -> Result<Session, ClientError> {
        let refresh_token = grant
            .refresh_token
            .clone()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ClientError::InvalidResponse("session grant carries no refresh token".into())
            })?;

        let session = Session {
            role: grant.role,
            name: grant.name.clone(),
            email: grant.email.clone(),
            refresh_token,
        };

        self.context.tokens.set(grant.access_token.clone());
        self.context.credentials.set(Some(session.clone()))?;
        info!(role = %session.role, "Session established");
        Ok(session)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        attempt: Attempt,
    ) -> Result<reqwest::Response, ClientError> {
        let token = self.context.tokens.get();
        let authorization = authorization_for(request, token.as_deref(), |path| {
            self.api.config().is_exempt(path)
        });

        debug!(
            method = %request.method,
            path = %request.path,
            attempt = attempt.number(),
            authorized = authorization.is_some(),
            "Sending API request"
        );

        let mut builder = self.api.request(request.method.clone(), &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = authorization {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        Ok(builder.send().await?)
    }

    async fn renew(&self, session: Session) -> Result<(), ClientError> {
        let grant = self.api.refresh_session(&session.refresh_token).await?;

        // The store may have moved on while the exchange was in flight
        let Some(current) = self
            .context
            .credentials
            .get()
            .filter(|current| current.refresh_token == session.refresh_token)
        else {
            debug!("Session changed during refresh exchange, discarding grant");
            return Ok(());
        };

        self.context.tokens.set(grant.access_token);

        if let Some(refresh_token) = grant.refresh_token.filter(|token| !token.is_empty()) {
            if let Err(e) = self
                .context
                .credentials
                .set(Some(current.with_refresh_token(refresh_token)))
            {
                warn!("Failed to persist rotated refresh token: {e}");
            }
        }

        info!("Access token refreshed");
        Ok(())
    }

    fn terminate(&self, reason: TerminationReason) -> ClientError {
        warn!(%reason, "Terminating session");

        if let Err(e) = self.context.credentials.clear() {
            warn!("Failed to clear stored session: {e}");
        }
        self.context.tokens.clear();
        self.context.navigator.navigate(AuthConfig::SIGN_IN_ROUTE);

        ClientError::SessionTerminated {
            reason: reason.to_string(),
        }
    }
}
