//! Middleware components for HTTP request processing

pub mod route_guard;

pub use route_guard::{GuardDecision, authorize_navigation, route_guard, session_cookie};
