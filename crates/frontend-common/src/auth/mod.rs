//! Authentication module

pub mod context;
pub mod error_messages;

pub use context::{AuthAction, AuthContextData, AuthProvider};
