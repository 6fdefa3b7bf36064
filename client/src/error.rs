//! Error types for the request client.

use thiserror::Error;

/// Ways a request can fail.
///
/// `Display` yields the text shown to the user: for [`FetchError::Status`] that
/// is exactly the server's `message` (or the HTTP status text).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, or the status text.
        message: String,
    },

    /// A 2xx response body was not valid JSON.
    #[error("invalid response body: {0}")]
    Parse(String),

    /// The request was refused before sending (e.g. file type not accepted).
    #[error("{0}")]
    Rejected(String),
}

impl FetchError {
    /// HTTP status of a [`FetchError::Status`] error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Parse(_) | Self::Rejected(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
