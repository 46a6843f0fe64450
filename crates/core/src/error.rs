//! Errors raised while persisting the session

use thiserror::Error;

pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Failure of the durable session medium
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session record could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// I/O failure with a plain description, for storage media without an
    /// underlying `io::Error`
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }
}
