//! Jobhub core session types and stores

pub mod config;
pub mod error;
pub mod navigation;
pub mod repository;
pub mod session;
pub mod store;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use config::AuthConfig;
pub use error::{CoreError, CoreResult};
pub use navigation::Navigator;
pub use repository::{
    CookieJar, CookieSessionRepository, FileCookieJar, MemoryCookieJar, MemorySessionRepository,
    SessionRepository, StoredCookie,
};
pub use session::{Role, Session};
pub use store::{CredentialStore, TokenHolder};
