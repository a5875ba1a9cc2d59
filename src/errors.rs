use std::fmt;

/// Errors raised by the backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    Http {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Server-supplied `error` message, or a generic fallback.
        message: String,
    },
    /// The request never produced a response (connection refused, DNS, reset...).
    Network(String),
    /// The response body could not be decoded into the expected shape.
    Decode(String),
    /// The endpoint could not be joined onto the configured base URL.
    InvalidUrl(String),
    /// The underlying HTTP client could not be constructed.
    ClientBuild(String),
}

impl ApiError {
    /// Builds an HTTP failure, falling back to a generic message when the
    /// server did not supply one.
    pub fn http(status: u16, server_message: Option<String>) -> Self {
        let message = server_message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error, status {}", status));
        ApiError::Http { status, message }
    }

    /// HTTP status code, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Shown verbatim to the user, so no prefix.
            ApiError::Http { message, .. } => write!(f, "{}", message),
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Decode(msg) => write!(f, "Invalid response: {}", msg),
            ApiError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ApiError::ClientBuild(msg) => write!(f, "Failed to create HTTP client: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    /// Converts a `reqwest::Error` into an `ApiError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
