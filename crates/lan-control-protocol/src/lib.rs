//! Command channel and wire protocol for lan-control.
//!
//! Every remote command is one JSON request against the host's `/api`
//! surface. This crate maps [`Command`](lan_control_types::Command)s to
//! routes and bodies, parses replies, and provides the [`CommandChannel`]
//! and [`SessionApi`] traits together with an HTTP implementation.

pub mod channel;
pub mod error;
pub mod http;
pub mod wire;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use channel::{CommandChannel, SessionApi};
pub use error::ProtocolError;
pub use http::HttpTransport;
pub use wire::{Method, Route};
