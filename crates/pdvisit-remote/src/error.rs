use thiserror::Error;

/// Errors returned by the hosted database client.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-2xx status.
    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The access key contains bytes that cannot go into an HTTP header.
    #[error("access key is not a valid header value")]
    InvalidApiKey,
}

impl RemoteError {
    /// `true` when the request never got an answer from the remote.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Http(e) if e.status().is_none())
    }
}
