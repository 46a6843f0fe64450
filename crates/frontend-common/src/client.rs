//! App-scoped session services
//!
//! One [`AppServices`] value is built per running app and handed to
//! whatever needs the API. Tests build a fresh one per case.

use jobhub_core::{CredentialStore, Navigator, SessionRepository, TokenHolder};
use jobhub_http::client::error::ClientError;
use jobhub_http::client::{ApiClientBuilder, SessionClient, SessionContext};
use std::sync::Arc;

/// Stores and client shared by one app instance
#[derive(Clone)]
pub struct AppServices {
    client: SessionClient,
}

impl AppServices {
    /// Wire the stores, the navigator and the session client together
    pub fn new(
        builder: ApiClientBuilder,
        repository: Arc<dyn SessionRepository>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let context = SessionContext::new(
            CredentialStore::new(repository),
            TokenHolder::new(),
            navigator,
        );
        let client = builder.build_session(context)?;
        Ok(Self { client })
    }

    /// The authenticated client every API call goes through
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.client.context().credentials
    }

    pub fn tokens(&self) -> &TokenHolder {
        &self.client.context().tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.client.context().navigator
    }
}
