//! Channel traits between the engine and the host.

use async_trait::async_trait;
use lan_control_types::{Command, LoginRequest, Reply, SessionInfo};

use crate::error::ProtocolError;

/// Sends remote-control commands to the host.
///
/// Every call is independent: no ordering is implied between concurrent
/// calls, and a failed call is not retried.
#[async_trait]
pub trait CommandChannel: Send + Sync + 'static {
    /// Send one command and wait for the host's reply.
    async fn send(&self, command: Command) -> Result<Reply, ProtocolError>;
}

/// Authentication endpoints on the host.
#[async_trait]
pub trait SessionApi: Send + Sync + 'static {
    /// Check whether the current session cookie is authenticated.
    async fn session(&self) -> Result<SessionInfo, ProtocolError>;

    /// Log in. On success the transport holds the session cookie.
    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ProtocolError>;

    /// Log out and drop the session on the host.
    async fn logout(&self) -> Result<(), ProtocolError>;
}
