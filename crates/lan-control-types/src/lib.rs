//! Shared types for lan-control.
//!
//! This crate contains all types shared across the lan-control workspace:
//! host screen state, movement vectors, remote commands and replies,
//! clipboard content, and the local input events fed into the engine.

pub mod clipboard;
pub mod command;
pub mod event;
pub mod screen;

pub use clipboard::{ClipboardContent, ClipboardKind, ClipboardOrigin, ClipboardPreview};
pub use command::{
    ClickRequest, Command, KeyAction, KeyRequest, LoginRequest, MouseButton, Reply, ScrollRequest,
    SessionInfo, SystemAction, TypeRequest,
};
pub use event::{
    ClickKind, FieldInput, InputEvent, KeyEvent, KeyTarget, Modifiers, Point, PointerEvent,
    PointerId, PointerKind, WheelEvent,
};
pub use screen::{MovementVector, RemoteScreenState, ScreenEdge, SurfaceSize};
