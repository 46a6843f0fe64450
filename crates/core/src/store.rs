//! Session state containers
//!
//! [`TokenHolder`] keeps the short-lived access token in memory only.
//! [`CredentialStore`] fronts a [`SessionRepository`] and publishes every
//! change on a watch channel so UI state can follow it. Both are cheap to
//! clone and meant to be shared by everything that belongs to one app
//! instance.

use crate::error::CoreResult;
use crate::repository::SessionRepository;
use crate::session::Session;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// In-memory holder for the access token
#[derive(Clone, Default)]
pub struct TokenHolder {
    token: Arc<ArcSwapOption<String>>,
}

impl TokenHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token; an empty token counts as none
    pub fn get(&self) -> Option<String> {
        self.token
            .load_full()
            .map(|token| token.as_ref().clone())
            .filter(|token| !token.is_empty())
    }

    pub fn set(&self, token: impl Into<String>) {
        self.token.store(Some(Arc::new(token.into())));
        debug!("Access token replaced");
    }

    pub fn clear(&self) {
        self.token.store(None);
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for TokenHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHolder")
            .field("present", &self.is_authenticated())
            .finish()
    }
}

/// Durable store for the session record
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn SessionRepository>,
    changes: Arc<watch::Sender<Option<Session>>>,
}

impl CredentialStore {
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        let (changes, _) = watch::channel(repository.load());
        Self {
            repository,
            changes: Arc::new(changes),
        }
    }

    /// Last persisted session
    pub fn get(&self) -> Option<Session> {
        self.repository.load()
    }

    /// Overwrite the persisted session; `None` clears it
    pub fn set(&self, session: Option<Session>) -> CoreResult<()> {
        match &session {
            Some(session) => {
                self.repository.save(session)?;
                info!(role = %session.role, "Session stored");
            }
            None => {
                self.repository.clear()?;
                info!("Session cleared");
            }
        }
        self.changes.send_replace(session);
        Ok(())
    }

    pub fn clear(&self) -> CoreResult<()> {
        self.set(None)
    }

    /// Follow session changes made through this store
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.changes.subscribe()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("session", &self.get())
            .finish()
    }
}
