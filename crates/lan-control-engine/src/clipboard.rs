//! Clipboard sync between the controlling device and the host.
//!
//! The device clipboard is asked what it allows before every transfer.
//! Anything it refuses degrades to a status message and a preview-only
//! result; only host errors are returned to the caller.

use std::sync::Arc;

use lan_control_clipboard::{ClipboardError, DeviceClipboard, DeviceItem};
use lan_control_protocol::{CommandChannel, ProtocolError};
use lan_control_types::{ClipboardContent, ClipboardOrigin, ClipboardPreview, Command};
use tracing::{debug, error, info, warn};

/// How the clipboard preview changes after a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewUpdate {
    Keep,
    Set(ClipboardPreview),
    Clear,
}

/// Outcome of one push or pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardReport {
    pub preview: PreviewUpdate,
    pub status: Option<String>,
    /// Content reached the other side.
    pub transferred: bool,
}

impl ClipboardReport {
    fn status(message: impl Into<String>) -> Self {
        Self {
            preview: PreviewUpdate::Keep,
            status: Some(message.into()),
            transferred: false,
        }
    }
}

pub struct ClipboardSync {
    device: Option<Arc<dyn DeviceClipboard>>,
    channel: Arc<dyn CommandChannel>,
    max_size: usize,
}

impl ClipboardSync {
    pub fn new(
        device: Option<Arc<dyn DeviceClipboard>>,
        channel: Arc<dyn CommandChannel>,
        max_size: usize,
    ) -> Self {
        Self {
            device,
            channel,
            max_size,
        }
    }

    /// Copy the device clipboard to the host.
    pub async fn push(&self) -> Result<ClipboardReport, ProtocolError> {
        let Some(device) = &self.device else {
            return Ok(ClipboardReport::status("device clipboard unavailable"));
        };
        let content = match read_device(device.as_ref()).await {
            Ok(Some(content)) if !content.is_empty() => content,
            Ok(_) => return Ok(ClipboardReport::status("nothing to push")),
            Err(e) => {
                if e.is_capability() {
                    warn!(error = %e, "cannot read device clipboard");
                } else {
                    error!(error = %e, "device clipboard read failed");
                }
                return Ok(ClipboardReport::status(format!("clipboard read failed: {e}")));
            }
        };
        if content.size() > self.max_size {
            let e = ClipboardError::TooLarge {
                size: content.size(),
                max: self.max_size,
            };
            warn!(error = %e, "not pushing clipboard");
            return Ok(ClipboardReport::status(e.to_string()));
        }

        self.channel
            .send(Command::ClipboardSet(content.clone()))
            .await?;
        info!(kind = ?content.kind(), size = content.size(), "pushed clipboard to host");
        Ok(ClipboardReport {
            preview: PreviewUpdate::Set(ClipboardPreview {
                content,
                origin: ClipboardOrigin::Device,
            }),
            status: Some("clipboard sent to host".to_string()),
            transferred: true,
        })
    }

    /// Fetch the host clipboard, writing it to the device when `mirror` is set.
    pub async fn pull(&self, mirror: bool) -> Result<ClipboardReport, ProtocolError> {
        let reply = self.channel.send(Command::ClipboardGet).await?;
        let content = match reply.content {
            Some(content) if !content.is_empty() => content,
            _ => {
                debug!("host clipboard is empty");
                return Ok(ClipboardReport {
                    preview: PreviewUpdate::Clear,
                    status: Some("host clipboard is empty".to_string()),
                    transferred: false,
                });
            }
        };
        let preview = PreviewUpdate::Set(ClipboardPreview {
            content: content.clone(),
            origin: ClipboardOrigin::Host,
        });

        if !mirror {
            return Ok(ClipboardReport {
                preview,
                status: Some("host clipboard fetched".to_string()),
                transferred: false,
            });
        }
        let Some(device) = &self.device else {
            warn!("no device clipboard, showing preview only");
            return Ok(ClipboardReport {
                preview,
                status: Some("preview only: device clipboard unavailable".to_string()),
                transferred: false,
            });
        };

        match write_device(device.as_ref(), &content).await {
            Ok(()) => {
                info!(
                    kind = ?content.kind(),
                    size = content.size(),
                    "copied host clipboard to device"
                );
                Ok(ClipboardReport {
                    preview,
                    status: Some("clipboard copied from host".to_string()),
                    transferred: true,
                })
            }
            Err(e) => {
                if e.is_capability() {
                    warn!(error = %e, "cannot write device clipboard, showing preview only");
                } else {
                    error!(error = %e, "device clipboard write failed");
                }
                Ok(ClipboardReport {
                    preview,
                    status: Some(format!("preview only: {e}")),
                    transferred: false,
                })
            }
        }
    }
}

/// Read the device clipboard, preferring an image over text when rich reads
/// are available.
async fn read_device(
    device: &dyn DeviceClipboard,
) -> Result<Option<ClipboardContent>, ClipboardError> {
    let caps = device.capabilities();
    if caps.read_items {
        let items = device.read_items().await?;
        let image = items.iter().find_map(|item| match item {
            DeviceItem::Image { bytes, mime } => Some(ClipboardContent::image(bytes, mime.clone())),
            DeviceItem::Text(_) => None,
        });
        let text = || {
            items.iter().find_map(|item| match item {
                DeviceItem::Text(text) => Some(ClipboardContent::text(text.clone())),
                DeviceItem::Image { .. } => None,
            })
        };
        return Ok(image.or_else(text));
    }
    if caps.read_text {
        return Ok(device.read_text().await?.map(ClipboardContent::text));
    }
    Err(ClipboardError::Unsupported)
}

async fn write_device(
    device: &dyn DeviceClipboard,
    content: &ClipboardContent,
) -> Result<(), ClipboardError> {
    let caps = device.capabilities();
    match content {
        ClipboardContent::Text { data } => {
            if !caps.write_text {
                return Err(ClipboardError::Unsupported);
            }
            device.write_text(data).await
        }
        ClipboardContent::Image { .. } => {
            if !caps.write_image {
                return Err(ClipboardError::Unsupported);
            }
            let Some(decoded) = content.decode_image() else {
                return Err(ClipboardError::FormatUnavailable);
            };
            let (bytes, mime) = decoded.map_err(|e| ClipboardError::Decode(e.to_string()))?;
            device.write_image(&bytes, mime).await
        }
    }
}
