//! User-friendly error message mappings

use jobhub_http::client::error::ClientError;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Convert client errors to user-friendly messages
pub fn get_user_friendly_error(error: &ClientError) -> String {
    match error {
        ClientError::SessionTerminated { .. } | ClientError::Gone(_) => SESSION_EXPIRED.to_string(),
        ClientError::AuthenticationFailed(_) => {
            "Incorrect email or password. Please try again.".to_string()
        }
        ClientError::Forbidden(_) => "You don't have permission to access this resource.".to_string(),
        ClientError::NotFound(_) => "The requested resource was not found.".to_string(),
        // Validation messages come from the API and are meant for the user
        ClientError::BadRequest(message) => message.clone(),
        ClientError::Request(e) if e.is_timeout() => {
            "The request timed out. Please try again.".to_string()
        }
        ClientError::Request(_) => {
            "Connection error. Please check your internet connection and try again.".to_string()
        }
        ClientError::ServerError { status, message } if *status < 500 => message.clone(),
        ClientError::ServerError { .. } => {
            "Something went wrong on our end. Please try again later.".to_string()
        }
        _ => "An unexpected error occurred. Please try again.".to_string(),
    }
}
