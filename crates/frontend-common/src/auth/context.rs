//! Authentication context and provider
//!
//! [`AuthProvider`] mirrors the durable session into a reducer-driven state
//! that UI code can read or watch, and owns the single sign-out entry point.

use super::error_messages::{SESSION_EXPIRED, get_user_friendly_error};
use crate::client::AppServices;
use jobhub_core::{AuthConfig, Session};
use jobhub_http::client::error::ClientError;
use jobhub_http::types::{SignInRequest, SignUpRequest, SignUpResponse, VerifyOtpRequest};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Authentication context data
#[derive(Clone, Debug, PartialEq)]
pub struct AuthContextData {
    pub session: Option<Session>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Authentication context actions
#[derive(Debug)]
pub enum AuthAction {
    /// Durable store changed outside of this context
    Restore(Option<Session>),
    Login(Session),
    Logout,
    SetLoading(bool),
    Failed(String),
}

impl Default for AuthContextData {
    fn default() -> Self {
        Self {
            session: None,
            is_loading: true,
            error: None,
        }
    }
}

impl AuthContextData {
    pub fn reduce(&self, action: AuthAction) -> Self {
        match action {
            AuthAction::Restore(Some(session)) => Self {
                session: Some(session),
                is_loading: false,
                error: None,
            },
            AuthAction::Restore(None) => Self {
                // Losing a live session means it was torn down under us
                error: self.session.as_ref().map(|_| SESSION_EXPIRED.to_string()),
                session: None,
                is_loading: false,
            },
            AuthAction::Login(session) => Self {
                session: Some(session),
                is_loading: false,
                error: None,
            },
            AuthAction::Logout => Self {
                session: None,
                is_loading: false,
                error: None,
            },
            AuthAction::SetLoading(is_loading) => Self {
                is_loading,
                ..self.clone()
            },
            AuthAction::Failed(error) => Self {
                is_loading: false,
                error: Some(error),
                ..self.clone()
            },
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

/// Provider of the authentication context
#[derive(Clone)]
pub struct AuthProvider {
    services: AppServices,
    state: Arc<watch::Sender<AuthContextData>>,
}

impl AuthProvider {
    /// Create the provider, seeded from the durable store
    pub fn new(services: AppServices) -> Self {
        let initial =
            AuthContextData::default().reduce(AuthAction::Restore(services.credentials().get()));
        let (state, _) = watch::channel(initial);
        Self {
            services,
            state: Arc::new(state),
        }
    }

    pub fn services(&self) -> &AppServices {
        &self.services
    }

    /// Snapshot of the current context
    pub fn state(&self) -> AuthContextData {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthContextData> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: AuthAction) {
        self.state.send_modify(|state| *state = state.reduce(action));
    }

    /// Follow the credential store so teardowns done by the client show up
    pub fn spawn_session_sync(&self) -> JoinHandle<()> {
        let mut changes = self.services.credentials().subscribe();
        let provider = self.clone();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let session = changes.borrow_and_update().clone();
                provider.dispatch(AuthAction::Restore(session));
            }
        })
    }

    /// Sign in and publish the new session
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<Session, ClientError> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.services.client().sign_in(request).await;
        self.settle(result)
    }

    /// Start a sign-up; the session only exists after OTP verification
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpResponse, ClientError> {
        self.dispatch(AuthAction::SetLoading(true));
        match self.services.client().sign_up(request).await {
            Ok(response) => {
                self.dispatch(AuthAction::SetLoading(false));
                Ok(response)
            }
            Err(e) => {
                self.dispatch(AuthAction::Failed(get_user_friendly_error(&e)));
                Err(e)
            }
        }
    }

    /// Complete a sign-up and publish the new session
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Session, ClientError> {
        self.dispatch(AuthAction::SetLoading(true));
        let result = self.services.client().verify_otp(request).await;
        self.settle(result)
    }

    /// End the session and reload the app at its root
    pub fn sign_out(&self) {
        if let Err(e) = self.services.credentials().clear() {
            warn!("Failed to clear stored session on sign-out: {e}");
        }
        self.services.tokens().clear();
        self.dispatch(AuthAction::Logout);
        info!("Signed out");
        self.services.navigator().navigate(AuthConfig::ROOT_ROUTE);
    }

    fn settle(&self, result: Result<Session, ClientError>) -> Result<Session, ClientError> {
        match result {
            Ok(session) => {
                self.dispatch(AuthAction::Login(session.clone()));
                Ok(session)
            }
            Err(e) => {
                self.dispatch(AuthAction::Failed(get_user_friendly_error(&e)));
                Err(e)
            }
        }
    }
}
