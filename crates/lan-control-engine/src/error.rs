//! Engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("protocol error: {0}")]
    Protocol(#[from] lan_control_protocol::ProtocolError),

    #[error("input error: {0}")]
    Input(#[from] lan_control_input::InputError),

    #[error("clipboard error: {0}")]
    Clipboard(#[from] lan_control_clipboard::ClipboardError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// The host rejected the session, so the user has to log in again.
    pub fn is_session_lost(&self) -> bool {
        match self {
            Self::NotAuthenticated => true,
            Self::Protocol(e) => e.is_session_lost(),
            _ => false,
        }
    }
}
