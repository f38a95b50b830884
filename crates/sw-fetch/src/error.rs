//! Fetch error types.

/// Error type for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (network failure).
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// A response arrived with a non-2xx status where one was required.
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    /// The URL could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Create a network failure for `url`.
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }
}
