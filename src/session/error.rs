//! Error types for the session transport.

use thiserror::Error;

/// Errors that can occur while issuing requests through the session client.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Only GET and POST are routed through the JSON request helper.
    #[error("unsupported request method {method}")]
    UnsupportedMethod {
        /// The rejected method.
        method: reqwest::Method,
    },

    /// The concatenated base URL and path do not form a valid URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body for {target}: {source}")]
    Encode {
        /// API path or form part the body was meant for.
        target: String,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A multipart part declared an unusable content type.
    #[error("invalid content type '{content_type}' for form part '{part}'")]
    InvalidPart {
        /// Form field name.
        part: String,
        /// The rejected MIME type.
        content_type: String,
    },

    /// Request timed out before a response arrived.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl SessionError {
    /// Maps a transport error, separating timeouts from other network failures.
    pub fn from_transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns `true` for failures worth a generic "try again" message.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }
}
