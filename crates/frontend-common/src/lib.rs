//! Shared frontend plumbing: app-scoped services and the auth context

pub mod auth;
pub mod client;

pub use auth::{AuthAction, AuthContextData, AuthProvider};
pub use client::AppServices;
