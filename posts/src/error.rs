//! Error types for the posts feature

use thiserror::Error;

/// Errors returned by a [`BlogService`](crate::service::BlogService)
///
/// The `Display` text is what a rejected fetch stores in
/// [`PostsState::error`](crate::types::PostsState::error).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure (connection refused, DNS, reset, ...)
    #[error("{0}")]
    RequestFailed(String),

    /// The server answered with a non-success status
    #[error("Request failed with status code {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response body was not the expected JSON
    #[error("Response parsing failed: {0}")]
    ResponseParseFailed(String),
}

/// Errors raised while loading [`Config`](crate::config::Config)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `POSTBOARD_API_URL` is not an absolute http(s) URL
    #[error("Invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl {
        /// Offending value
        url: String,
        /// Parser message
        reason: String,
    },

    /// A numeric variable could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidNumber {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_displays_bare_message() {
        let error = ApiError::RequestFailed("Network Error".to_string());
        assert_eq!(error.to_string(), "Network Error");
    }

    #[test]
    fn test_status_error_display() {
        let error = ApiError::UnexpectedStatus {
            status: 404,
            message: "{}".to_string(),
        };
        assert_eq!(error.to_string(), "Request failed with status code 404");
    }
}
