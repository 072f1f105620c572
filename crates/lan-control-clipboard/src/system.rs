//! System clipboard backend built on `arboard`.
//!
//! Text only: `arboard` exposes images as raw RGBA frames rather than
//! encoded files, so image reads and writes are reported as unsupported.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ClipboardError;
use crate::{ClipboardCapabilities, DeviceClipboard, DeviceItem};

pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    /// Open the system clipboard.
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = arboard::Clipboard::new().map_err(map_error)?;
        debug!("system clipboard opened");
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }

    fn with<T>(
        &self,
        f: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> Result<T, ClipboardError> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| ClipboardError::Other(anyhow::anyhow!("clipboard lock poisoned")))?;
        f(&mut clipboard).map_err(map_error)
    }
}

fn map_error(error: arboard::Error) -> ClipboardError {
    match error {
        arboard::Error::ContentNotAvailable => ClipboardError::FormatUnavailable,
        arboard::Error::ClipboardNotSupported => ClipboardError::Unavailable,
        arboard::Error::ConversionFailure => ClipboardError::Decode(error.to_string()),
        other => ClipboardError::Other(anyhow::Error::new(other)),
    }
}

#[async_trait]
impl DeviceClipboard for SystemClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        ClipboardCapabilities::TEXT_ONLY
    }

    async fn read_items(&self) -> Result<Vec<DeviceItem>, ClipboardError> {
        Err(ClipboardError::Unsupported)
    }

    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        match self.with(arboard::Clipboard::get_text) {
            Ok(text) => Ok(Some(text)),
            Err(ClipboardError::FormatUnavailable) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.with(|clipboard| clipboard.set_text(text))
    }

    async fn write_image(&self, _bytes: &[u8], _mime: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unsupported)
    }
}
