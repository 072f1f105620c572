//! Per-session input engine.
//!
//! One `SessionEngine` exists per authenticated session and is dropped
//! wholesale on logout. It owns every piece of input state (capture mode,
//! held keys and modifiers, gesture and edge tracking) and turns local
//! events into [`Effect`]s. It performs no I/O and never sleeps: time comes
//! in as an argument and timers are exposed through [`SessionEngine::next_deadline`].

use lan_control_input::{CaptureSurface, Modifier};
use lan_control_types::{
    Command, InputEvent, MovementVector, PointerEvent, PointerKind, RemoteScreenState,
};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::edge::EdgeTracker;
use crate::effect::{Effect, Feedback, Outbox};
use crate::keyboard::KeyboardDispatch;
use crate::pointer::PointerEngine;
use crate::state::{CaptureState, Disposition};
use crate::timer::earliest;

pub struct SessionEngine {
    pointer: PointerEngine,
    keyboard: KeyboardDispatch,
    edges: EdgeTracker,
    /// Last state reported by the host; `None` until the first report.
    remote: Option<RemoteScreenState>,
    clipboard_enabled: bool,
    outbox: Outbox,
}

impl SessionEngine {
    pub fn new(config: &Config, surface: Box<dyn CaptureSurface>) -> Self {
        Self {
            pointer: PointerEngine::new(surface, config.pointer.clone(), config.touch.clone()),
            keyboard: KeyboardDispatch::new(&config.keyboard, &config.clipboard),
            edges: EdgeTracker::new(&config.pointer),
            remote: None,
            clipboard_enabled: config.clipboard.enabled,
            outbox: Outbox::default(),
        }
    }

    /// Poll the host screen once so touch scaling has dimensions to work with.
    pub fn start(&mut self) {
        self.outbox.request(
            Command::MouseState,
            Feedback::RemoteState { movement: None },
        );
    }

    /// Feed one local input event.
    pub fn handle(&mut self, event: InputEvent, now: Instant) -> Disposition {
        let out = &mut self.outbox;
        match event {
            InputEvent::PointerDown(pointer) => self.pointer.down(&pointer, now),
            InputEvent::PointerMove(pointer) => {
                self.keyboard.refresh_modifiers(pointer.modifiers, now);
                self.pointer.moved(&pointer, self.remote.as_ref(), now)
            }
            InputEvent::PointerUp(pointer) | InputEvent::PointerCancel(pointer) => {
                self.pointer_up(&pointer, now)
            }
            InputEvent::Wheel(wheel) => PointerEngine::wheel(&wheel, out),
            InputEvent::KeyDown(key) => {
                self.keyboard
                    .key_down(&key, self.pointer.is_locked(), now, out)
            }
            InputEvent::KeyUp(key) => self.keyboard.key_up(&key, out),
            InputEvent::Field(input) => {
                KeyboardDispatch::field_input(&input, out);
                Disposition::Consumed
            }
            InputEvent::FieldBlur => {
                self.keyboard.release_all(out);
                Disposition::PassThrough
            }
            InputEvent::BatchSubmit(text) => {
                KeyboardDispatch::batch_submit(&text, out);
                Disposition::Consumed
            }
            InputEvent::ClickButton(kind) => {
                out.send(PointerEngine::click_button(kind));
                Disposition::Consumed
            }
            InputEvent::System(action) => {
                info!(action = action.as_str(), "system action");
                out.request(Command::System(action), Feedback::Alert);
                Disposition::Consumed
            }
            InputEvent::PointerLockChanged(true) => {
                self.lock_acquired();
                Disposition::Consumed
            }
            InputEvent::PointerLockChanged(false) => {
                self.lock_lost();
                Disposition::Consumed
            }
            InputEvent::PointerLockError => {
                self.pointer.lock_failed();
                self.converge("pointer lock error");
                self.outbox
                    .status("pointer lock unavailable, using direct capture");
                Disposition::Consumed
            }
            InputEvent::Blur => {
                self.converge("window blurred");
                Disposition::PassThrough
            }
            InputEvent::VisibilityChanged { hidden: true } => {
                self.converge("surface hidden");
                Disposition::PassThrough
            }
            InputEvent::VisibilityChanged { hidden: false } => Disposition::PassThrough,
            InputEvent::HelpOpened => {
                self.converge("help opened");
                Disposition::PassThrough
            }
        }
    }

    fn pointer_up(&mut self, event: &PointerEvent, now: Instant) -> Disposition {
        if !self.pointer.capture().is_active() && event.kind != PointerKind::Touch {
            return Disposition::PassThrough;
        }
        let release = self.pointer.up(event, now, &mut self.outbox);
        if release.release_keys {
            self.keyboard.release_all(&mut self.outbox);
        }
        if let Some(click) = release.click {
            self.outbox.send(click);
        }
        Disposition::Consumed
    }

    fn lock_acquired(&mut self) {
        info!("pointer locked");
        self.pointer.lock_acquired();
        self.edges.reset();
        self.keyboard.release_all(&mut self.outbox);
        self.outbox.request(
            Command::MouseState,
            Feedback::RemoteState { movement: None },
        );
        if self.clipboard_enabled {
            self.outbox.push(Effect::ClipboardPush { then: None });
        }
    }

    fn lock_lost(&mut self) {
        let was_locked = self.pointer.lock_lost();
        info!(was_locked, "pointer lock released");
        self.edges.reset();
        self.keyboard.release_all(&mut self.outbox);
        if was_locked && self.clipboard_enabled {
            self.outbox.push(Effect::ClipboardPull { mirror: true });
        }
    }

    /// A state report from the host, with the movement that produced it.
    pub fn remote_state(
        &mut self,
        state: RemoteScreenState,
        movement: Option<MovementVector>,
        now: Instant,
    ) {
        self.remote = Some(state);
        self.edges
            .update(&state, movement, self.pointer.is_locked(), now);
    }

    /// Return to the baseline: capture released, gestures and edge tracking
    /// cleared, every key and modifier released on the host.
    pub fn converge(&mut self, reason: &str) {
        debug!(reason, "resetting input state");
        self.pointer.exit_lock();
        self.pointer.reset();
        self.edges.reset();
        self.keyboard.release_all(&mut self.outbox);
    }

    /// Fire every timer that is due.
    pub fn poll(&mut self, now: Instant) {
        self.pointer.poll(now, &mut self.outbox);
        self.keyboard.poll(now, &mut self.outbox);
        if self.edges.poll(now) {
            info!("edge release, handing control back");
            self.pointer.exit_lock();
            self.pointer.reset();
            self.keyboard.release_all(&mut self.outbox);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.pointer.next_deadline(),
            self.keyboard.next_deadline(),
            self.edges.next_deadline(),
        ])
    }

    /// Take the effects queued since the last call, in order.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.outbox.drain()
    }

    pub fn capture(&self) -> CaptureState {
        self.pointer.capture()
    }

    pub fn remote(&self) -> Option<RemoteScreenState> {
        self.remote
    }

    pub fn held_modifiers(&self) -> Vec<Modifier> {
        self.keyboard.held_modifiers()
    }

    pub fn active_keys(&self) -> Vec<&'static str> {
        self.keyboard.active_keys()
    }

    pub fn is_edge_release_pending(&self) -> bool {
        self.edges.is_release_pending()
    }
}
