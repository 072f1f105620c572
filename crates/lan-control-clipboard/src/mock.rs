//! Mock device clipboard for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::ClipboardError;
use crate::{ClipboardCapabilities, DeviceClipboard, DeviceItem};

#[derive(Debug)]
struct MockClipboardState {
    capabilities: ClipboardCapabilities,
    items: Vec<DeviceItem>,
    denied: bool,
    writes: Vec<DeviceItem>,
}

/// In-memory device clipboard with configurable capabilities.
pub struct MockClipboard {
    state: Arc<Mutex<MockClipboardState>>,
}

impl Default for MockClipboard {
    fn default() -> Self {
        Self::new(ClipboardCapabilities::FULL)
    }
}

impl MockClipboard {
    pub fn new(capabilities: ClipboardCapabilities) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockClipboardState {
                capabilities,
                items: Vec::new(),
                denied: false,
                writes: Vec::new(),
            })),
        }
    }

    /// Get a clonable handle for observing the clipboard from tests.
    pub fn handle(&self) -> MockClipboardHandle {
        MockClipboardHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockClipboard`.
#[derive(Clone)]
pub struct MockClipboardHandle {
    state: Arc<Mutex<MockClipboardState>>,
}

impl MockClipboardHandle {
    /// Replace the clipboard contents.
    pub fn set_items(&self, items: Vec<DeviceItem>) {
        self.state.lock().unwrap().items = items;
    }

    pub fn items(&self) -> Vec<DeviceItem> {
        self.state.lock().unwrap().items.clone()
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<DeviceItem> {
        self.state.lock().unwrap().writes.clone()
    }

    /// Deny all further access.
    pub fn deny(&self) {
        self.state.lock().unwrap().denied = true;
    }
}

impl MockClipboard {
    fn check(
        &self,
        allowed: impl FnOnce(ClipboardCapabilities) -> bool,
    ) -> Result<(), ClipboardError> {
        let state = self.state.lock().unwrap();
        if state.denied {
            return Err(ClipboardError::AccessDenied);
        }
        if !allowed(state.capabilities) {
            return Err(ClipboardError::Unsupported);
        }
        Ok(())
    }

    fn write(&self, item: DeviceItem) {
        let mut state = self.state.lock().unwrap();
        state.items = vec![item.clone()];
        state.writes.push(item);
    }
}

#[async_trait]
impl DeviceClipboard for MockClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        self.state.lock().unwrap().capabilities
    }

    async fn read_items(&self) -> Result<Vec<DeviceItem>, ClipboardError> {
        self.check(|caps| caps.read_items)?;
        Ok(self.state.lock().unwrap().items.clone())
    }

    async fn read_text(&self) -> Result<Option<String>, ClipboardError> {
        self.check(|caps| caps.read_text)?;
        let state = self.state.lock().unwrap();
        Ok(state.items.iter().find_map(|item| match item {
            DeviceItem::Text(text) => Some(text.clone()),
            DeviceItem::Image { .. } => None,
        }))
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.check(|caps| caps.write_text)?;
        self.write(DeviceItem::Text(text.to_string()));
        Ok(())
    }

    async fn write_image(&self, bytes: &[u8], mime: &str) -> Result<(), ClipboardError> {
        self.check(|caps| caps.write_image)?;
        self.write(DeviceItem::Image {
            bytes: bytes.to_vec(),
            mime: mime.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_only_clipboard_refuses_images() {
        let clipboard = MockClipboard::new(ClipboardCapabilities::TEXT_ONLY);
        let err = clipboard.write_image(&[1, 2], "image/png").await.unwrap_err();
        assert!(matches!(err, ClipboardError::Unsupported));
        assert!(err.is_capability());

        clipboard.write_text("hi").await.unwrap();
        assert_eq!(clipboard.read_text().await.unwrap().as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn denied_clipboard() {
        let clipboard = MockClipboard::default();
        clipboard.handle().deny();
        assert!(matches!(
            clipboard.read_items().await,
            Err(ClipboardError::AccessDenied)
        ));
    }
}
