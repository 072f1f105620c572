//! Clipboard content types.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Clipboard content as exchanged with the host.
///
/// Serialises as `{"type":"text","data":...}` or
/// `{"type":"image","data":<base64>,"mime":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipboardContent {
    /// Plain UTF-8 text.
    Text { data: String },
    /// Image bytes, base64-encoded, with their MIME type.
    Image { data: String, mime: String },
}

/// Kind of clipboard content, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardKind {
    Text,
    Image,
}

impl ClipboardContent {
    /// Create text clipboard content.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { data: s.into() }
    }

    /// Create image clipboard content from raw bytes.
    #[must_use]
    pub fn image(bytes: &[u8], mime: impl Into<String>) -> Self {
        Self::Image {
            data: STANDARD.encode(bytes),
            mime: mime.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ClipboardKind {
        match self {
            Self::Text { .. } => ClipboardKind::Text,
            Self::Image { .. } => ClipboardKind::Image,
        }
    }

    /// The text, if this is text content.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { data } => Some(data),
            Self::Image { .. } => None,
        }
    }

    /// Decode the raw image bytes and MIME type, if this is image content.
    pub fn decode_image(&self) -> Option<Result<(Vec<u8>, &str), base64::DecodeError>> {
        match self {
            Self::Text { .. } => None,
            Self::Image { data, mime } => {
                Some(STANDARD.decode(data).map(|bytes| (bytes, mime.as_str())))
            }
        }
    }

    /// Whether there is nothing worth transferring.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text { data } | Self::Image { data, .. } => data.is_empty(),
        }
    }

    /// Size of the payload in bytes, as it travels on the wire.
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Text { data } | Self::Image { data, .. } => data.len(),
        }
    }
}

/// Which side a previewed clipboard value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipboardOrigin {
    Host,
    Device,
}

impl std::fmt::Display for ClipboardOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Device => write!(f, "device"),
        }
    }
}

/// The last known clipboard value, for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPreview {
    pub content: ClipboardContent,
    pub origin: ClipboardOrigin,
}
