//! Request pipeline stages
//!
//! Every API call is described by an immutable [`ApiRequest`] and sent with
//! an explicit [`Attempt`]. The stages deciding what happens around the
//! network call are pure: [`authorization_for`] picks the header value and
//! [`classify`] turns the response status into an [`Outcome`].

use super::error::ClientError;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use std::fmt;

/// Which try of a request this is. Only one retry is ever allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attempt(u8);

impl Attempt {
    pub const FIRST: Self = Self(1);
    pub const RETRY: Self = Self(2);

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn is_retry(self) -> bool {
        self.0 > 1
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Attempt {
    fn default() -> Self {
        Self::FIRST
    }
}

/// A request that can be issued more than once
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Why a session was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The API answered 401
    Unauthorized,
    /// The token was still stale after a completed refresh
    StaleAfterRefresh,
    /// The refresh exchange itself failed
    RefreshFailed,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unauthorized => "unauthorized",
            Self::StaleAfterRefresh => "access token rejected after refresh",
            Self::RefreshFailed => "refresh exchange failed",
        })
    }
}

/// What to do with a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Hand the response to the caller unchanged
    Deliver,
    /// Refresh the access token and re-issue the request
    Refresh,
    /// Tear the session down
    Terminate(TerminationReason),
}

/// Distinguished status for a stale access token
pub const STALE_CREDENTIAL: StatusCode = StatusCode::GONE;

/// Header value to send, if any
pub fn authorization_for<'a>(
    request: &ApiRequest,
    token: Option<&'a str>,
    is_exempt: impl Fn(&str) -> bool,
) -> Option<&'a str> {
    token
        .filter(|token| !token.is_empty())
        .filter(|_| !is_exempt(&request.path))
}

/// Decide what a response status means for the session
pub fn classify(status: StatusCode, attempt: Attempt) -> Outcome {
    if status == StatusCode::UNAUTHORIZED {
        Outcome::Terminate(TerminationReason::Unauthorized)
    } else if status != STALE_CREDENTIAL {
        Outcome::Deliver
    } else if attempt.is_retry() {
        Outcome::Terminate(TerminationReason::StaleAfterRefresh)
    } else {
        Outcome::Refresh
    }
}
