//! Jobhub API client

pub mod auth;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod session;

pub use config::ClientConfig;
pub use pipeline::{ApiRequest, Attempt, Outcome, TerminationReason};
pub use session::{SessionClient, SessionContext};

use error::ClientError;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = "jobhub-client/0.1.0";

/// Plain API client with no session handling
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a request builder for a path below the base URL
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode_response(response).await
    }
}

/// Turn a response into `T`, mapping non-success statuses to errors
pub(crate) async fn decode_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        Ok(response.json().await?)
    } else {
        let message = response.text().await.unwrap_or_else(|_| status.to_string());
        Err(ClientError::from_status(status, message))
    }
}

/// Builder for [`ApiClient`] and [`SessionClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    config: Option<ClientConfig>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Override endpoint paths and exemptions
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build a plain client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        client_builder =
            client_builder.user_agent(self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()));

        Ok(ApiClient {
            client: client_builder.build()?,
            base_url,
            config: Arc::new(self.config.unwrap_or_default()),
        })
    }

    /// Build a client that runs every request through the session pipeline
    pub fn build_session(self, context: SessionContext) -> Result<SessionClient, ClientError> {
        Ok(SessionClient::new(self.build()?, context))
    }
}
