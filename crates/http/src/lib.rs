//! Jobhub HTTP module: the authenticated API client and the route guard
//!
//! The `client` feature provides the request pipeline every API call goes
//! through (token attachment, refresh-and-retry, session teardown). The
//! `server` feature provides the axum middleware that keeps visitors out of
//! route namespaces that belong to another role.

pub mod types;

#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "server")]
pub mod middleware;

#[cfg(feature = "client")]
pub use client::{ApiClient, ApiClientBuilder, SessionClient, SessionContext, error::ClientError};
#[cfg(feature = "server")]
pub use middleware::route_guard::{GuardDecision, authorize_navigation, route_guard};
