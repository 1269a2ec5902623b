//! Error types for GSQL sessions.

use thiserror::Error;

/// Errors that can occur while negotiating or using a GSQL session.
#[derive(Debug, Error)]
pub enum GsqlError {
    /// The HTTP transport failed (connect, timeout, invalid request).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a body that could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Every entry of the version table was rejected by the server.
    #[error("unable to establish compatible connection after {attempts} attempt(s)")]
    Incompatible {
        /// Number of versions tried.
        attempts: usize,
    },

    /// The server accepted the client version but rejected the credentials.
    #[error("credentials rejected: {0}")]
    CredentialsRejected(String),

    /// Reading a streamed command response failed midway.
    #[error("stream read failed: {0}")]
    StreamRead(String),

    /// A command was submitted before negotiation succeeded.
    #[error("session is not established")]
    NotEstablished,

    /// The cookie artifact could not be serialized or parsed.
    #[error("cookie error: {0}")]
    Cookie(#[from] serde_json::Error),

    /// IO error while writing output or reading input.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GsqlError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_body() || err.is_decode() {
            Self::StreamRead(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
