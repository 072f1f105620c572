//! Session gate: authentication and controller lifetime.
//!
//! A controller, and with it all input state, exists only while the host
//! reports an authenticated session. Logging out or losing the session
//! stops it, releasing held input on the host first.

use std::sync::Arc;

use lan_control_clipboard::DeviceClipboard;
use lan_control_input::CaptureSurface;
use lan_control_protocol::{CommandChannel, SessionApi};
use lan_control_types::LoginRequest;
use tracing::{info, warn};

use crate::clipboard::ClipboardSync;
use crate::config::Config;
use crate::controller::{Controller, ControllerHandle};
use crate::error::EngineError;
use crate::session::SessionEngine;

/// Creates a fresh capture surface for each session.
pub type SurfaceFactory = Box<dyn Fn() -> Box<dyn CaptureSurface> + Send + Sync>;

pub struct SessionGate {
    session: Arc<dyn SessionApi>,
    channel: Arc<dyn CommandChannel>,
    config: Config,
    clipboard: Option<Arc<dyn DeviceClipboard>>,
    surfaces: SurfaceFactory,
    controller: Option<ControllerHandle>,
    username: Option<String>,
}

impl SessionGate {
    /// Create a gate over a host connection that serves both the session
    /// endpoints and remote commands.
    pub fn new<T>(
        host: Arc<T>,
        config: Config,
        clipboard: Option<Arc<dyn DeviceClipboard>>,
        surfaces: SurfaceFactory,
    ) -> Self
    where
        T: SessionApi + CommandChannel,
    {
        let session: Arc<dyn SessionApi> = host.clone();
        let channel: Arc<dyn CommandChannel> = host;
        Self {
            session,
            channel,
            config,
            clipboard,
            surfaces,
            controller: None,
            username: None,
        }
    }

    /// Ask the host whether the session is still valid, starting a
    /// controller if it is and tearing down if it is not.
    pub async fn check(&mut self) -> Result<bool, EngineError> {
        match self.session.session().await {
            Ok(info) if info.authenticated => {
                self.username = info.username;
                if !self.is_authenticated() {
                    self.teardown().await;
                    self.start();
                }
                Ok(true)
            }
            Ok(_) => {
                info!("host reports no session");
                self.teardown().await;
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "session check failed");
                self.teardown().await;
                Err(e.into())
            }
        }
    }

    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<(), EngineError> {
        self.teardown().await;
        let info = self
            .session
            .login(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
                remember,
            })
            .await?;
        if !info.authenticated {
            return Err(EngineError::NotAuthenticated);
        }
        info!(user = ?info.username, "logged in");
        self.username = info.username;
        self.start();
        Ok(())
    }

    /// Stop the controller, then end the session on the host. Host failures
    /// are logged; the local state is reset either way.
    pub async fn logout(&mut self) {
        self.teardown().await;
        if let Err(e) = self.session.logout().await {
            warn!(error = %e, "logout request failed");
        }
        info!("logged out");
    }

    pub fn controller(&self) -> Option<&ControllerHandle> {
        self.controller.as_ref()
    }

    /// A controller is running and the host has not rejected the session.
    pub fn is_authenticated(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(|controller| controller.is_running() && !controller.status().session_lost)
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn start(&mut self) {
        let engine = SessionEngine::new(&self.config, (self.surfaces)());
        let clipboard = ClipboardSync::new(
            self.clipboard.clone(),
            Arc::clone(&self.channel),
            self.config.clipboard.max_size,
        );
        let controller = Controller::new(
            engine,
            Arc::clone(&self.channel),
            clipboard,
            self.username.clone(),
        );
        self.controller = Some(controller.spawn());
    }

    async fn teardown(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.shutdown().await;
        }
    }
}
