//! Error types for the feed client.

/// Errors that can occur when fetching from the legislature's servers.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or invalid URL).
    #[error("Request failed")]
    RequestFailed,
    /// The server returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response body could not be decoded into the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl Error {
    /// Whether the request is worth repeating (rate limiting or a server fault).
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RequestFailed => true,
            Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            Error::Decode(_) => false,
        }
    }
}
