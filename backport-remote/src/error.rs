//! Error types for remote calls

use std::fmt;

/// Result type for remote operations
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Errors that can occur while talking to the tag API or the patch service
#[derive(Debug)]
pub enum RemoteError {
    /// Network/HTTP transport error
    Network(String),

    /// Request timeout
    Timeout(String),

    /// Server answered with a non-success status
    Http { url: String, status: u16, body: String },

    /// Response body could not be decoded
    Serialization(String),

    /// Endpoint could not be parsed as a URL
    InvalidEndpoint(String),

    /// Client could not be configured
    Config(String),
}

impl RemoteError {
    /// HTTP status code, when the server responded at all
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Network(e) => write!(f, "Network error: {e}"),
            RemoteError::Timeout(e) => write!(f, "Timeout: {e}"),
            RemoteError::Http { url, status, body } => {
                write!(f, "HTTP {status} from {url}")?;
                if !body.trim().is_empty() {
                    write!(f, ": {}", body.trim())?;
                }
                Ok(())
            }
            RemoteError::Serialization(e) => write!(f, "Serialization error: {e}"),
            RemoteError::InvalidEndpoint(e) => write!(f, "Invalid endpoint: {e}"),
            RemoteError::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout(err.to_string())
        } else if err.is_decode() {
            RemoteError::Serialization(err.to_string())
        } else {
            RemoteError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidEndpoint(err.to_string())
    }
}
