//! Clipboard subsystem errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard access denied")]
    AccessDenied,

    #[error("requested format not available")]
    FormatUnavailable,

    #[error("clipboard content too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: usize, max: usize },

    #[error("operation not supported by this clipboard")]
    Unsupported,

    #[error("backend not available on this platform")]
    Unavailable,

    #[error("invalid clipboard data: {0}")]
    Decode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ClipboardError {
    /// A capability or permission problem rather than a transient failure.
    pub fn is_capability(&self) -> bool {
        matches!(
            self,
            Self::AccessDenied | Self::Unsupported | Self::Unavailable | Self::FormatUnavailable
        )
    }
}
