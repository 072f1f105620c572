//! Client-side input engine for lan-control.
//!
//! Translates local pointer, touch, keyboard, and clipboard events into
//! remote-control commands for a host, manages pointer capture and edge
//! release, and gates everything behind an authenticated session.

pub mod clipboard;
pub mod config;
pub mod controller;
mod dispatch;
pub mod edge;
pub mod effect;
pub mod error;
pub mod gate;
pub mod keyboard;
pub mod modifiers;
pub mod pointer;
pub mod session;
pub mod state;
pub mod timer;

pub use clipboard::{ClipboardReport, ClipboardSync, PreviewUpdate};
pub use config::Config;
pub use controller::{Controller, ControllerEvent, ControllerHandle, EngineStatus};
pub use effect::{Effect, Feedback};
pub use error::EngineError;
pub use gate::{SessionGate, SurfaceFactory};
pub use session::SessionEngine;
pub use state::{CaptureState, Disposition};
