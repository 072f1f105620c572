//! Protocol and transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ProtocolError {
    /// The host no longer recognises the session cookie.
    #[must_use]
    pub fn is_session_lost(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}
