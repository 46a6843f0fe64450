//! Role-based route guard
//!
//! Runs before a protected page renders and redirects visitors whose stored
//! role does not own the requested namespace. It only compares the role
//! recorded in the session cookie; it does not look at tokens at all. The
//! API stays the real authorization boundary.

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use jobhub_core::repository::decode_role;
use jobhub_core::{AuthConfig, Role};
use tracing::debug;

/// Result of checking a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Role required by the namespace `path` falls in, if any
pub fn required_role(path: &str) -> Option<Role> {
    AuthConfig::PROTECTED_NAMESPACES
        .iter()
        .find(|(prefix, _)| {
            path.strip_prefix(*prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .map(|(_, role)| *role)
}

/// Decide whether a navigation to `path` may proceed
///
/// `stored` is the raw session cookie value, still URL-encoded.
pub fn authorize_navigation(path: &str, stored: Option<&str>) -> GuardDecision {
    let Some(required) = required_role(path) else {
        return GuardDecision::Allow;
    };

    match stored.and_then(decode_role) {
        Some(role) if role == required => GuardDecision::Allow,
        role => {
            debug!(path, ?role, %required, "Redirecting away from protected namespace");
            GuardDecision::Redirect(AuthConfig::SIGN_UP_ROUTE)
        }
    }
}

/// Raw value of the session cookie
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AuthConfig::SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

/// Middleware applying [`authorize_navigation`] to every request
pub async fn route_guard(request: Request, next: Next) -> Response {
    let stored = session_cookie(request.headers());

    match authorize_navigation(request.uri().path(), stored.as_deref()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(location) => Redirect::temporary(location).into_response(),
    }
}
