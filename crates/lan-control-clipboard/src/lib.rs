//! Device clipboard access for lan-control.
//!
//! Defines the [`DeviceClipboard`] trait for the controlling device's
//! clipboard. Platforms differ widely in what they allow: some only read
//! text, some refuse image writes, some deny access outright. Callers check
//! [`ClipboardCapabilities`] first and fall back accordingly.

use async_trait::async_trait;

pub mod error;

#[cfg(feature = "system")]
pub mod system;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::ClipboardError;

#[cfg(feature = "system")]
pub use system::SystemClipboard;

/// What the device clipboard allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipboardCapabilities {
    /// Plain-text reads.
    pub read_text: bool,
    /// Rich reads that may return images as well as text.
    pub read_items: bool,
    pub write_text: bool,
    pub write_image: bool,
}

impl ClipboardCapabilities {
    /// Everything supported.
    pub const FULL: Self = Self {
        read_text: true,
        read_items: true,
        write_text: true,
        write_image: true,
    };

    /// Plain text in both directions only.
    pub const TEXT_ONLY: Self = Self {
        read_text: true,
        read_items: false,
        write_text: true,
        write_image: false,
    };
}

/// One entry read from the device clipboard, in raw form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceItem {
    Text(String),
    Image { bytes: Vec<u8>, mime: String },
}

/// The controlling device's clipboard.
#[async_trait]
pub trait DeviceClipboard: Send + Sync + 'static {
    /// Probe what this clipboard supports.
    fn capabilities(&self) -> ClipboardCapabilities;

    /// Read every item currently on the clipboard. Requires `read_items`.
    async fn read_items(&self) -> Result<Vec<DeviceItem>, ClipboardError>;

    /// Read plain text. `None` when the clipboard holds no text.
    async fn read_text(&self) -> Result<Option<String>, ClipboardError>;

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    /// Write raw image bytes of the given MIME type. Requires `write_image`.
    async fn write_image(&self, bytes: &[u8], mime: &str) -> Result<(), ClipboardError>;
}
