//! Mock command channel for testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lan_control_types::{
    ClipboardContent, Command, LoginRequest, RemoteScreenState, Reply, SessionInfo,
};

use crate::channel::{CommandChannel, SessionApi};
use crate::error::ProtocolError;

/// Shared state for observing what `MockChannel` received.
#[derive(Debug, Default)]
struct MockChannelState {
    sent: Vec<Command>,
    screen: RemoteScreenState,
    clipboard: Option<ClipboardContent>,
    failing: HashSet<&'static str>,
    session: SessionInfo,
    password: Option<String>,
    expired: bool,
}

/// Mock host for testing.
///
/// Moves update a simulated cursor clamped to the screen bounds, so replies
/// carry realistic state for edge detection. Clipboard set/get round-trip
/// through an in-memory value.
#[derive(Clone)]
pub struct MockChannel {
    state: Arc<Mutex<MockChannelState>>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockChannelState::default())),
        }
    }

    /// A mock host with the given screen size and cursor position.
    pub fn with_screen(screen: RemoteScreenState) -> Self {
        let channel = Self::new();
        channel.state.lock().unwrap().screen = screen;
        channel
    }

    /// Get a clonable handle for observing and steering the mock from tests.
    pub fn handle(&self) -> MockChannelHandle {
        MockChannelHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockChannel`.
#[derive(Clone)]
pub struct MockChannelHandle {
    state: Arc<Mutex<MockChannelState>>,
}

impl MockChannelHandle {
    /// Snapshot of every command received, in order.
    pub fn sent(&self) -> Vec<Command> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Forget recorded commands.
    pub fn clear(&self) {
        self.state.lock().unwrap().sent.clear();
    }

    pub fn screen(&self) -> RemoteScreenState {
        self.state.lock().unwrap().screen
    }

    pub fn set_screen(&self, screen: RemoteScreenState) {
        self.state.lock().unwrap().screen = screen;
    }

    /// Current host clipboard.
    pub fn clipboard(&self) -> Option<ClipboardContent> {
        self.state.lock().unwrap().clipboard.clone()
    }

    pub fn set_clipboard(&self, content: Option<ClipboardContent>) {
        self.state.lock().unwrap().clipboard = content;
    }

    /// Make every command with this name (e.g. `"system/lock"`) fail.
    pub fn fail(&self, name: &'static str) {
        self.state.lock().unwrap().failing.insert(name);
    }

    /// Accept logins with this password.
    pub fn set_password(&self, password: &str) {
        self.state.lock().unwrap().password = Some(password.to_string());
    }

    /// Mark the session as authenticated without a login call.
    pub fn set_authenticated(&self, username: &str) {
        self.state.lock().unwrap().session = SessionInfo {
            authenticated: true,
            username: Some(username.to_string()),
        };
    }

    /// Expire the session; later commands fail with 401.
    pub fn expire_session(&self) {
        let mut state = self.state.lock().unwrap();
        state.session = SessionInfo::default();
        state.expired = true;
    }
}

#[async_trait]
impl CommandChannel for MockChannel {
    async fn send(&self, command: Command) -> Result<Reply, ProtocolError> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(command.clone());
        if state.expired {
            return Err(ProtocolError::Rejected {
                status: 401,
                message: "Unauthorized".to_string(),
            });
        }
        if state.failing.contains(command.name()) {
            return Err(ProtocolError::Rejected {
                status: 500,
                message: format!("{} failed", command.name()),
            });
        }
        let reply = match command {
            Command::MouseMove(movement) => {
                let screen = &mut state.screen;
                screen.x = (screen.x + movement.dx).clamp(0.0, screen.width.max(0.0));
                screen.y = (screen.y + movement.dy).clamp(0.0, screen.height.max(0.0));
                Reply {
                    state: Some(*screen),
                    content: None,
                }
            }
            Command::MouseState => Reply {
                state: Some(state.screen),
                content: None,
            },
            Command::ClipboardGet => Reply {
                state: None,
                content: state.clipboard.clone(),
            },
            Command::ClipboardSet(content) => {
                state.clipboard = Some(content);
                Reply::default()
            }
            _ => Reply::default(),
        };
        Ok(reply)
    }
}

#[async_trait]
impl SessionApi for MockChannel {
    async fn session(&self) -> Result<SessionInfo, ProtocolError> {
        Ok(self.state.lock().unwrap().session.clone())
    }

    async fn login(&self, request: LoginRequest) -> Result<SessionInfo, ProtocolError> {
        let mut state = self.state.lock().unwrap();
        if state.password.as_deref() != Some(request.password.as_str()) {
            return Err(ProtocolError::Rejected {
                status: 401,
                message: "Invalid credentials".to_string(),
            });
        }
        state.session = SessionInfo {
            authenticated: true,
            username: Some(request.username),
        };
        state.expired = false;
        Ok(state.session.clone())
    }

    async fn logout(&self) -> Result<(), ProtocolError> {
        self.state.lock().unwrap().session = SessionInfo::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lan_control_types::MovementVector;

    #[tokio::test]
    async fn moves_clamp_to_screen() {
        let channel = MockChannel::with_screen(RemoteScreenState::new(100.0, 50.0, 95.0, 10.0));
        let reply = channel
            .send(Command::MouseMove(MovementVector::new(20.0, -20.0)))
            .await
            .unwrap();
        assert_eq!(reply.state, Some(RemoteScreenState::new(100.0, 50.0, 100.0, 0.0)));
        assert_eq!(channel.handle().sent().len(), 1);
    }

    #[tokio::test]
    async fn configured_failures() {
        let channel = MockChannel::new();
        channel.handle().fail("mouse/click");
        let err = channel
            .send(Command::click(lan_control_types::MouseButton::Left))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Rejected { status: 500, .. }));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let channel = MockChannel::new();
        channel.handle().set_password("secret");
        let bad = LoginRequest {
            username: "admin".into(),
            password: "nope".into(),
            remember: false,
        };
        assert!(channel.login(bad).await.unwrap_err().is_session_lost());

        let good = LoginRequest {
            username: "admin".into(),
            password: "secret".into(),
            remember: true,
        };
        let info = channel.login(good).await.unwrap();
        assert!(info.authenticated);
        assert!(channel.session().await.unwrap().authenticated);
        channel.logout().await.unwrap();
        assert!(!channel.session().await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn expired_session_rejects_commands() {
        let channel = MockChannel::new();
        channel.handle().set_authenticated("admin");
        channel.handle().expire_session();
        let err = channel.send(Command::MouseState).await.unwrap_err();
        assert!(err.is_session_lost());
        assert!(!channel.session().await.unwrap().authenticated);
    }
}
