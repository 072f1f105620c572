//! Async runtime around a [`SessionEngine`].
//!
//! The controller owns the engine and processes its events one at a time:
//! local input, replies posted back by the dispatch lanes, and timer deadlines.
//! Effects are handed to the dispatch lanes without waiting on the host.

use std::sync::Arc;

use lan_control_input::Modifier;
use lan_control_protocol::CommandChannel;
use lan_control_types::{ClipboardPreview, InputEvent, MovementVector, RemoteScreenState};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardReport, ClipboardSync, PreviewUpdate};
use crate::dispatch::Lanes;
use crate::effect::Effect;
use crate::error::EngineError;
use crate::session::SessionEngine;
use crate::state::CaptureState;

/// Events processed by the controller's main loop.
#[derive(Debug)]
pub enum ControllerEvent {
    /// A local input event.
    Input(InputEvent),
    /// Host screen state from a reply, with the movement that produced it.
    RemoteState {
        state: RemoteScreenState,
        movement: Option<MovementVector>,
    },
    /// A clipboard transfer finished.
    Clipboard(ClipboardReport),
    /// A command the user asked for explicitly failed.
    Alert(String),
    Status(String),
    /// The host rejected the session cookie.
    SessionLost,
    Shutdown,
}

/// Snapshot of the controller, published after every event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStatus {
    pub username: Option<String>,
    pub capture: CaptureState,
    pub remote: Option<RemoteScreenState>,
    pub held_modifiers: Vec<Modifier>,
    pub active_keys: Vec<&'static str>,
    pub clipboard: Option<ClipboardPreview>,
    /// Latest status line.
    pub message: Option<String>,
    /// Latest failure of an explicit user action.
    pub alert: Option<String>,
    pub session_lost: bool,
    pub running: bool,
}

pub struct Controller {
    engine: SessionEngine,
    status: EngineStatus,
    event_tx: mpsc::Sender<ControllerEvent>,
    event_rx: mpsc::Receiver<ControllerEvent>,
    status_tx: watch::Sender<EngineStatus>,
    lanes: Lanes,
}

impl Controller {
    /// Create a controller and start its dispatch lanes.
    pub fn new(
        engine: SessionEngine,
        channel: Arc<dyn CommandChannel>,
        clipboard: ClipboardSync,
        username: Option<String>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let status = EngineStatus {
            username,
            running: true,
            ..EngineStatus::default()
        };
        let (status_tx, _) = watch::channel(status.clone());
        let lanes = Lanes::spawn(channel, clipboard, event_tx.clone());

        Self {
            engine,
            status,
            event_tx,
            event_rx,
            status_tx,
            lanes,
        }
    }

    /// Get a clone of the event sender for feeding events into the controller.
    pub fn event_sender(&self) -> mpsc::Sender<ControllerEvent> {
        self.event_tx.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status_tx.subscribe()
    }

    /// Run the controller on its own task.
    pub fn spawn(self) -> ControllerHandle {
        let events = self.event_sender();
        let status = self.subscribe();
        let task = tokio::spawn(self.run());
        ControllerHandle {
            events,
            status,
            task,
        }
    }

    /// Run the event loop until shutdown or session loss.
    pub async fn run(mut self) {
        info!(user = ?self.status.username, "controller running");
        self.engine.start();
        self.flush();

        loop {
            let deadline = self.engine.next_deadline();
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(ControllerEvent::Shutdown) | None => {
                            info!("shutting down");
                            break;
                        }
                        Some(ControllerEvent::SessionLost) => {
                            warn!("session lost, stopping controller");
                            self.status.session_lost = true;
                            break;
                        }
                        Some(event) => self.handle_event(event),
                    }
                }
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.engine.poll(Instant::now());
                }
            }
            self.flush();
            self.publish();
        }

        self.engine.converge("controller stopping");
        self.flush();
        let Self {
            mut status,
            status_tx,
            lanes,
            ..
        } = self;
        lanes.close().await;
        status.running = false;
        status.active_keys.clear();
        status.held_modifiers.clear();
        status_tx.send_replace(status);
        info!("controller stopped");
    }

    fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Input(input) => {
                let disposition = self.engine.handle(input, Instant::now());
                debug!(?disposition, "input handled");
            }
            ControllerEvent::RemoteState { state, movement } => {
                self.engine.remote_state(state, movement, Instant::now());
            }
            ControllerEvent::Clipboard(report) => {
                match report.preview {
                    PreviewUpdate::Keep => {}
                    PreviewUpdate::Set(preview) => self.status.clipboard = Some(preview),
                    PreviewUpdate::Clear => self.status.clipboard = None,
                }
                if report.status.is_some() {
                    self.status.message = report.status;
                }
            }
            ControllerEvent::Alert(message) => {
                self.status.alert = Some(message.clone());
                self.status.message = Some(message);
            }
            ControllerEvent::Status(message) => self.status.message = Some(message),
            ControllerEvent::SessionLost | ControllerEvent::Shutdown => {}
        }
    }

    /// Hand queued effects to the dispatch lanes, keeping status lines local.
    fn flush(&mut self) {
        for effect in self.engine.take_effects() {
            match effect {
                Effect::Status(message) => self.status.message = Some(message),
                effect => self.lanes.submit(effect),
            }
        }
    }

    fn publish(&mut self) {
        self.status.capture = self.engine.capture();
        self.status.remote = self.engine.remote();
        self.status.held_modifiers = self.engine.held_modifiers();
        self.status.active_keys = self.engine.active_keys();
        self.status_tx.send_if_modified(|current| {
            if *current == self.status {
                return false;
            }
            current.clone_from(&self.status);
            true
        });
    }
}

/// Handle to a running controller.
pub struct ControllerHandle {
    events: mpsc::Sender<ControllerEvent>,
    status: watch::Receiver<EngineStatus>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn send_input(&self, event: InputEvent) -> Result<(), EngineError> {
        self.events
            .send(ControllerEvent::Input(event))
            .await
            .map_err(|_| EngineError::Other(anyhow::anyhow!("controller stopped")))
    }

    pub fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the controller, releasing held input on the host first.
    pub async fn shutdown(self) {
        // Already stopped if the send fails.
        let _ = self.events.send(ControllerEvent::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "controller task failed");
        }
    }
}
