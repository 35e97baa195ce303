//! Error types for filesync-github.

use thiserror::Error;

/// Failures while talking to the hosting service.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    #[error("request to {url} failed: {detail}")]
    Transport { url: String, detail: String },

    /// The host answered with an error status.
    #[error("request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The host answered 2xx but the body could not be decoded.
    #[error("unexpected response from host: {0}")]
    Decode(#[from] std::io::Error),
}
