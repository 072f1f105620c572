//! Delivery of engine effects to the host.
//!
//! Effects leave through two lanes. Pointer motion (moves and scrolls) uses
//! a coalescing lane: while one motion command is in flight, everything that
//! arrives meanwhile is merged into a single command, so a slow host delays
//! motion by about one round trip and never builds a backlog. Everything else
//! (keys, clicks, text, clipboard jobs, system actions) uses a bounded ordered
//! lane, so a key's down always reaches the host before its up.

use std::sync::Arc;

use lan_control_protocol::{CommandChannel, ProtocolError};
use lan_control_types::{Command, MovementVector, ScrollRequest};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::clipboard::{ClipboardReport, ClipboardSync};
use crate::controller::ControllerEvent;
use crate::effect::{Effect, Feedback};

/// Maximum effects waiting in either lane.
const LANE_CAPACITY: usize = 1024;

/// Sending side of both lanes.
pub(crate) struct Lanes {
    ordered: mpsc::Sender<Effect>,
    motion: mpsc::Sender<Motion>,
    tasks: [JoinHandle<()>; 2],
}

impl Lanes {
    /// Start both lane tasks.
    pub(crate) fn spawn(
        channel: Arc<dyn CommandChannel>,
        clipboard: ClipboardSync,
        feedback: mpsc::Sender<ControllerEvent>,
    ) -> Self {
        let link = Link { channel, feedback };
        let (ordered, ordered_rx) = mpsc::channel(LANE_CAPACITY);
        let (motion, motion_rx) = mpsc::channel(LANE_CAPACITY);
        let ordered_lane = OrderedLane {
            link: link.clone(),
            clipboard,
        };
        let tasks = [
            tokio::spawn(ordered_lane.run(ordered_rx)),
            tokio::spawn(run_motion(link, motion_rx)),
        ];
        Self {
            ordered,
            motion,
            tasks,
        }
    }

    /// Queue an effect on the lane it belongs to. Never waits.
    pub(crate) fn submit(&self, effect: Effect) {
        let motion = match effect {
            Effect::Request {
                command: Command::MouseMove(movement),
                ..
            } => Motion::Move(movement),
            Effect::Send(Command::MouseScroll(scroll)) => Motion::Scroll(scroll),
            effect => {
                if let Err(e) = self.ordered.try_send(effect) {
                    warn!(error = %e, "ordered lane full, dropping effect");
                }
                return;
            }
        };
        if let Err(e) = self.motion.try_send(motion) {
            warn!(error = %e, "motion lane full, dropping pointer motion");
        }
    }

    /// Close both lanes and wait until everything queued has been sent.
    pub(crate) async fn close(self) {
        let Self {
            ordered,
            motion,
            tasks,
        } = self;
        drop(ordered);
        drop(motion);
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "dispatch task failed");
            }
        }
    }
}

/// Host connection plus the way back into the controller.
#[derive(Clone)]
struct Link {
    channel: Arc<dyn CommandChannel>,
    feedback: mpsc::Sender<ControllerEvent>,
}

impl Link {
    async fn send(&self, command: Command) {
        let name = command.name();
        if let Err(e) = self.channel.send(command).await {
            self.failed(name, &e);
        }
    }

    async fn request(&self, command: Command, feedback: Feedback) {
        let name = command.name();
        match self.channel.send(command).await {
            Ok(reply) => {
                if let (Feedback::RemoteState { movement }, Some(state)) = (feedback, reply.state)
                {
                    self.post(ControllerEvent::RemoteState { state, movement });
                }
            }
            Err(e) => {
                if feedback == Feedback::Alert && !e.is_session_lost() {
                    self.post(ControllerEvent::Alert(format!("{name} failed: {e}")));
                }
                self.failed(name, &e);
            }
        }
    }

    fn failed(&self, name: &str, e: &ProtocolError) {
        if e.is_session_lost() {
            warn!(command = name, error = %e, "host rejected session");
            self.post(ControllerEvent::SessionLost);
        } else {
            error!(command = name, error = %e, "command failed");
        }
    }

    fn post(&self, event: ControllerEvent) {
        if let Err(e) = self.feedback.try_send(event) {
            debug!(error = %e, "controller not accepting feedback");
        }
    }
}

/// Sends discrete commands and clipboard jobs one at a time, in order.
struct OrderedLane {
    link: Link,
    clipboard: ClipboardSync,
}

impl OrderedLane {
    async fn run(self, mut effects: mpsc::Receiver<Effect>) {
        while let Some(effect) = effects.recv().await {
            self.execute(effect).await;
        }
        debug!("ordered lane drained");
    }

    async fn execute(&self, effect: Effect) {
        match effect {
            Effect::Send(command) => self.link.send(command).await,
            Effect::Request { command, feedback } => self.link.request(command, feedback).await,
            Effect::ClipboardPush { then } => {
                let result = self.clipboard.push().await;
                self.clipboard_done("push", result);
                if let Some(command) = then {
                    self.link.send(command).await;
                }
            }
            Effect::ClipboardPull { mirror } => {
                let result = self.clipboard.pull(mirror).await;
                self.clipboard_done("pull", result);
            }
            Effect::Status(message) => self.link.post(ControllerEvent::Status(message)),
        }
    }

    fn clipboard_done(&self, direction: &str, result: Result<ClipboardReport, ProtocolError>) {
        match result {
            Ok(report) => self.link.post(ControllerEvent::Clipboard(report)),
            Err(e) => {
                self.link
                    .post(ControllerEvent::Status(format!("clipboard {direction} failed: {e}")));
                self.link.failed("clipboard", &e);
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Motion {
    Move(MovementVector),
    Scroll(ScrollRequest),
}

/// Motion merged while the previous command was in flight.
#[derive(Debug, Default)]
struct Batch {
    movement: Option<MovementVector>,
    scroll: Option<ScrollRequest>,
    merged: usize,
}

impl Batch {
    fn add(&mut self, motion: Motion) {
        self.merged += 1;
        match motion {
            Motion::Move(movement) => {
                *self.movement.get_or_insert_with(MovementVector::default) += movement;
            }
            Motion::Scroll(scroll) => {
                let total = self.scroll.get_or_insert_with(ScrollRequest::default);
                total.horizontal += scroll.horizontal;
                total.vertical += scroll.vertical;
            }
        }
    }
}

async fn run_motion(link: Link, mut motions: mpsc::Receiver<Motion>) {
    while let Some(first) = motions.recv().await {
        let mut batch = Batch::default();
        batch.add(first);
        while let Ok(next) = motions.try_recv() {
            batch.add(next);
        }
        if batch.merged > 1 {
            debug!(merged = batch.merged, "coalesced pointer motion");
        }
        if let Some(movement) = batch.movement {
            let feedback = Feedback::RemoteState {
                movement: Some(movement),
            };
            link.request(Command::MouseMove(movement), feedback).await;
        }
        if let Some(scroll) = batch.scroll {
            link.send(Command::MouseScroll(scroll)).await;
        }
    }
    debug!("motion lane drained");
}
