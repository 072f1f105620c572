//! Side effects requested by the session engine.
//!
//! The engine is synchronous and never touches the network. Every command
//! and clipboard transfer it decides on is queued here as an [`Effect`]; the
//! controller drains the queue in order and hands it to the dispatcher.

use lan_control_types::{Command, MovementVector};

/// What to do with a command's reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Feedback {
    /// The reply carries remote screen state for edge tracking. `movement`
    /// is the delta that produced it, if any.
    RemoteState { movement: Option<MovementVector> },
    /// Failures are surfaced to the user instead of only being logged.
    Alert,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fire-and-forget command; failures are logged and dropped.
    Send(Command),
    /// Command whose reply or failure is posted back to the engine.
    Request { command: Command, feedback: Feedback },
    /// Copy the device clipboard to the host, then send `then`.
    ClipboardPush { then: Option<Command> },
    /// Fetch the host clipboard, optionally writing it to the device.
    ClipboardPull { mirror: bool },
    /// User-facing status line.
    Status(String),
}

impl Effect {
    /// The command this effect sends, if any.
    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::Send(command) | Self::Request { command, .. } => Some(command),
            Self::ClipboardPush { then } => then.as_ref(),
            Self::ClipboardPull { .. } | Self::Status(_) => None,
        }
    }
}

/// Ordered queue of pending effects.
#[derive(Debug, Default)]
pub struct Outbox {
    effects: Vec<Effect>,
}

impl Outbox {
    pub fn send(&mut self, command: Command) {
        self.effects.push(Effect::Send(command));
    }

    pub fn request(&mut self, command: Command, feedback: Feedback) {
        self.effects.push(Effect::Request { command, feedback });
    }

    pub fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.effects.extend(commands.into_iter().map(Effect::Send));
    }

    pub fn status(&mut self, message: impl Into<String>) {
        self.effects.push(Effect::Status(message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
