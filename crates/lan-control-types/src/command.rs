//! Remote commands and host replies.
//!
//! Every command maps to one JSON request on the host's `/api` surface. The
//! payload structs here serialise to exactly the bodies the host expects.

use serde::{Deserialize, Serialize};

use crate::clipboard::ClipboardContent;
use crate::screen::{MovementVector, RemoteScreenState};

/// Mouse button identifier on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Map a pointer-event button code. Only primary (0) and secondary (2)
    /// are forwarded from a physical mouse.
    #[must_use]
    pub fn from_pointer_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Middle => write!(f, "middle"),
        }
    }
}

/// What to do with a key on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAction {
    Down,
    Up,
    /// Down and up in one step.
    Press,
}

/// Host-level system actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAction {
    Lock,
    Unlock,
    Shutdown,
}

impl SystemAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Shutdown => "shutdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRequest {
    pub button: MouseButton,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollRequest {
    pub horizontal: f64,
    pub vertical: f64,
}

impl ScrollRequest {
    #[must_use]
    pub fn is_negligible(&self) -> bool {
        self.horizontal.abs() < 0.01 && self.vertical.abs() < 0.01
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequest {
    pub key: String,
    pub action: KeyAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRequest {
    pub text: String,
}

/// A single remote-control command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    MouseMove(MovementVector),
    MouseClick(ClickRequest),
    MouseScroll(ScrollRequest),
    /// One-shot poll of the host cursor and screen state.
    MouseState,
    Key(KeyRequest),
    Type(TypeRequest),
    ClipboardGet,
    ClipboardSet(ClipboardContent),
    System(SystemAction),
}

impl Command {
    #[must_use]
    pub fn click(button: MouseButton) -> Self {
        Self::MouseClick(ClickRequest {
            button,
            double: None,
        })
    }

    #[must_use]
    pub fn key(key: impl Into<String>, action: KeyAction) -> Self {
        Self::Key(KeyRequest {
            key: key.into(),
            action,
        })
    }

    #[must_use]
    pub fn type_text(text: impl Into<String>) -> Self {
        Self::Type(TypeRequest { text: text.into() })
    }

    /// Short name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MouseMove(_) => "mouse/move",
            Self::MouseClick(_) => "mouse/click",
            Self::MouseScroll(_) => "mouse/scroll",
            Self::MouseState => "mouse/state",
            Self::Key(_) => "keyboard/key",
            Self::Type(_) => "keyboard/type",
            Self::ClipboardGet => "clipboard/get",
            Self::ClipboardSet(_) => "clipboard/set",
            Self::System(SystemAction::Lock) => "system/lock",
            Self::System(SystemAction::Unlock) => "system/unlock",
            Self::System(SystemAction::Shutdown) => "system/shutdown",
        }
    }
}

/// The parts of a host reply the client consumes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub state: Option<RemoteScreenState>,
    #[serde(default)]
    pub content: Option<ClipboardContent>,
}

/// Session presence as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub remember: bool,
}
