//! Pointer and trackpad translation.
//!
//! Turns local pointer events into remote move, click, and scroll commands:
//!
//! - locked mouse: device deltas, summed per frame;
//! - unlocked mouse: deltas between successive absolute positions;
//! - touch: per-contact deltas scaled to the remote screen, one finger moves
//!   and two or more scroll;
//! - releases become clicks (mouse), taps (touch and pen), or two- and
//!   three-finger taps (right and middle click).

use std::collections::BTreeMap;

use lan_control_input::CaptureSurface;
use lan_control_types::{
    ClickKind, ClickRequest, Command, MouseButton, MovementVector, Point, PointerEvent,
    PointerId, PointerKind, RemoteScreenState, ScrollRequest, WheelEvent,
};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::{PointerConfig, TouchConfig};
use crate::effect::{Feedback, Outbox};
use crate::state::{CaptureState, Disposition};
use crate::timer::{earliest, Timer};

/// One touch interaction, from the first contact down to the last one up.
#[derive(Debug, Clone)]
struct TouchSession {
    start: Instant,
    max_pointers: usize,
    /// Manhattan distance moved by all contacts together.
    total_travel: f64,
}

/// A press that may turn into a tap.
#[derive(Debug, Clone, Copy)]
struct TapCandidate {
    start: Point,
    time: Instant,
}

/// What a pointer release asks of the rest of the engine.
#[derive(Debug, Default, PartialEq)]
pub struct Release {
    /// Release held keys and modifiers before `click`.
    pub release_keys: bool,
    /// Mouse click to send after the key release.
    pub click: Option<Command>,
}

pub struct PointerEngine {
    surface: Box<dyn CaptureSurface>,
    pointer: PointerConfig,
    touch: TouchConfig,
    capture: CaptureState,
    last_point: Point,
    pending_move: MovementVector,
    move_frame: Timer,
    pending_scroll: ScrollRequest,
    scroll_frame: Timer,
    touches: BTreeMap<PointerId, Point>,
    touch_session: Option<TouchSession>,
    tap: Option<TapCandidate>,
    last_click: Option<(MouseButton, Instant)>,
    /// The platform refused a lock request this session.
    lock_refused: bool,
}

impl PointerEngine {
    pub fn new(
        surface: Box<dyn CaptureSurface>,
        pointer: PointerConfig,
        touch: TouchConfig,
    ) -> Self {
        Self {
            surface,
            pointer,
            touch,
            capture: CaptureState::Idle,
            last_point: Point::default(),
            pending_move: MovementVector::default(),
            move_frame: Timer::default(),
            pending_scroll: ScrollRequest::default(),
            scroll_frame: Timer::default(),
            touches: BTreeMap::new(),
            touch_session: None,
            tap: None,
            last_click: None,
            lock_refused: false,
        }
    }

    pub fn capture(&self) -> CaptureState {
        self.capture
    }

    pub fn is_locked(&self) -> bool {
        self.capture.is_locked()
    }

    pub fn down(&mut self, event: &PointerEvent, now: Instant) -> Disposition {
        if !self.capture.is_active() {
            self.capture = CaptureState::Direct;
        }
        self.last_point = event.position;

        match event.kind {
            PointerKind::Touch => {
                self.set_capture(event.id);
                self.touches.insert(event.id, event.position);
                let contacts = self.touches.len();
                match &mut self.touch_session {
                    Some(session) => session.max_pointers = session.max_pointers.max(contacts),
                    None => {
                        self.touch_session = Some(TouchSession {
                            start: now,
                            max_pointers: contacts,
                            total_travel: 0.0,
                        });
                    }
                }
                self.tap = (contacts == 1).then_some(TapCandidate {
                    start: event.position,
                    time: now,
                });
            }
            PointerKind::Mouse => {
                self.tap = None;
                if event.button == 0 && self.lock_available() {
                    if self.capture.can_request_lock() {
                        self.request_lock(event.id);
                    }
                } else if !self.capture.is_locked() {
                    self.set_capture(event.id);
                }
            }
            PointerKind::Pen => {
                self.tap = Some(TapCandidate {
                    start: event.position,
                    time: now,
                });
                self.set_capture(event.id);
            }
        }
        Disposition::Consumed
    }

    fn request_lock(&mut self, id: PointerId) {
        match self.surface.request_pointer_lock() {
            Ok(()) => {
                debug!("pointer lock requested");
                self.capture = CaptureState::LockRequested;
            }
            Err(e) => {
                warn!(error = %e, "pointer lock request failed, using direct capture");
                self.set_capture(id);
            }
        }
    }

    fn set_capture(&mut self, id: PointerId) {
        if let Err(e) = self.surface.set_pointer_capture(id) {
            warn!(error = %e, pointer = id.0, "failed to capture pointer");
        }
    }

    fn release_capture(&mut self, id: PointerId) {
        if let Err(e) = self.surface.release_pointer_capture(id) {
            debug!(error = %e, pointer = id.0, "failed to release pointer capture");
        }
    }

    pub fn moved(
        &mut self,
        event: &PointerEvent,
        remote: Option<&RemoteScreenState>,
        now: Instant,
    ) -> Disposition {
        if !self.capture.is_active() {
            return Disposition::PassThrough;
        }

        if event.kind == PointerKind::Touch {
            let Some(current) = self.touches.get_mut(&event.id) else {
                return Disposition::Consumed;
            };
            let dx = event.position.x - current.x;
            let dy = event.position.y - current.y;
            *current = event.position;
            let contacts = self.touches.len();
            if let Some(session) = &mut self.touch_session {
                session.total_travel += dx.abs() + dy.abs();
                session.max_pointers = session.max_pointers.max(contacts);
            }
            if dx.abs() < 0.01 && dy.abs() < 0.01 {
                return Disposition::Consumed;
            }
            if contacts >= 2 {
                let scale = self.scroll_scale(remote);
                self.pending_scroll.horizontal += dx * scale;
                self.pending_scroll.vertical += -dy * scale;
                self.scroll_frame.arm_if_idle(now, self.pointer.frame_interval());
            } else {
                let scale = self.move_scale(remote);
                self.queue_move(MovementVector::new(dx * scale, dy * scale), now);
            }
            return Disposition::Consumed;
        }

        let delta = if self.capture.is_locked() {
            MovementVector::new(event.movement_x, event.movement_y)
        } else {
            let delta = MovementVector::new(
                event.position.x - self.last_point.x,
                event.position.y - self.last_point.y,
            );
            self.last_point = event.position;
            delta
        };
        if delta.is_zero() {
            return Disposition::PassThrough;
        }
        self.queue_move(delta, now);
        Disposition::Consumed
    }

    fn queue_move(&mut self, delta: MovementVector, now: Instant) {
        self.pending_move += delta;
        self.move_frame.arm_if_idle(now, self.pointer.frame_interval());
    }

    pub fn up(&mut self, event: &PointerEvent, now: Instant, out: &mut Outbox) -> Release {
        let mut release = Release::default();
        if !self.capture.is_active() && event.kind != PointerKind::Touch {
            return release;
        }
        let mut handled_gesture = false;

        if event.kind == PointerKind::Touch {
            self.release_capture(event.id);
            self.touches.remove(&event.id);
            let remaining = self.touches.len();
            if remaining == 0 {
                if let Some(session) = self.touch_session.take() {
                    handled_gesture = self.finish_touch_session(&session, now, out);
                }
            } else if let Some(session) = &mut self.touch_session {
                session.max_pointers = session.max_pointers.max(remaining);
            }
            if remaining > 0 {
                self.tap = None;
                return release;
            }
        }

        if !self.capture.is_locked() {
            self.capture = CaptureState::Idle;
            self.release_capture(event.id);
            if let Some(tap) = self.tap.take() {
                if !handled_gesture && self.is_tap(&tap, event.position, now) {
                    out.send(Command::click(MouseButton::Left));
                }
            }
            release.release_keys = true;
        }

        if event.kind == PointerKind::Mouse {
            if let Some(button) = MouseButton::from_pointer_code(event.button) {
                release.click = Some(self.click(button, now));
            }
        }
        self.tap = None;
        release
    }

    fn finish_touch_session(
        &mut self,
        session: &TouchSession,
        now: Instant,
        out: &mut Outbox,
    ) -> bool {
        let quick = now.saturating_duration_since(session.start) < self.touch.multi_tap()
            && session.total_travel < self.touch.multi_tap_travel_px;
        let button = match session.max_pointers {
            2 if quick => MouseButton::Right,
            3 if quick => MouseButton::Middle,
            _ => return false,
        };
        debug!(fingers = session.max_pointers, %button, "multi-finger tap");
        self.pending_scroll = ScrollRequest::default();
        self.scroll_frame.cancel();
        out.send(Command::click(button));
        true
    }

    fn is_tap(&self, tap: &TapCandidate, position: Point, now: Instant) -> bool {
        now.saturating_duration_since(tap.time) < self.pointer.tap_max()
            && tap.start.manhattan(position) < self.pointer.tap_max_travel_px
    }

    fn click(&mut self, button: MouseButton, now: Instant) -> Command {
        let window = self.pointer.double_click();
        let double = matches!(
            self.last_click,
            Some((last, at)) if last == button && now.saturating_duration_since(at) < window
        );
        self.last_click = Some((button, now));
        Command::MouseClick(ClickRequest {
            button,
            double: Some(double && button == MouseButton::Left),
        })
    }

    /// Touch move scale: remote screen size relative to the rendered
    /// surface, falling back to the viewport when the remote size is unknown.
    pub fn move_scale(&self, remote: Option<&RemoteScreenState>) -> f64 {
        let surface = self.surface.surface_size();
        if surface.is_empty() {
            return self.touch.move_min;
        }
        let base = match remote.filter(|state| state.has_bounds()) {
            Some(state) => (state.width / surface.width).max(state.height / surface.height),
            None => {
                let viewport = self.surface.viewport_size().longest_side();
                let viewport = if viewport > 0.0 { viewport } else { surface.width };
                viewport / surface.longest_side()
            }
        };
        (base * self.touch.move_base).clamp(self.touch.move_min, self.touch.move_max)
    }

    pub fn scroll_scale(&self, remote: Option<&RemoteScreenState>) -> f64 {
        (self.move_scale(remote) * self.touch.scroll_factor)
            .clamp(self.touch.scroll_min, self.touch.scroll_max)
    }

    /// Flush the frame buffers whose frame has ended.
    pub fn poll(&mut self, now: Instant, out: &mut Outbox) {
        if self.move_frame.take_if_due(now) {
            let movement = std::mem::take(&mut self.pending_move);
            if !movement.is_zero() {
                out.request(
                    Command::MouseMove(movement),
                    Feedback::RemoteState {
                        movement: Some(movement),
                    },
                );
            }
        }
        if self.scroll_frame.take_if_due(now) {
            let scroll = std::mem::take(&mut self.pending_scroll);
            if !scroll.is_negligible() {
                out.send(Command::MouseScroll(scroll));
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.move_frame.deadline(), self.scroll_frame.deadline()])
    }

    /// Wheel input is forwarded immediately.
    pub fn wheel(event: &WheelEvent, out: &mut Outbox) -> Disposition {
        if event.delta_x == 0.0 && event.delta_y == 0.0 {
            return Disposition::Consumed;
        }
        out.send(Command::MouseScroll(ScrollRequest {
            horizontal: event.delta_x,
            vertical: -event.delta_y,
        }));
        Disposition::Consumed
    }

    /// On-screen click buttons.
    pub fn click_button(kind: ClickKind) -> Command {
        match kind {
            ClickKind::Left => Command::click(MouseButton::Left),
            ClickKind::Right => Command::click(MouseButton::Right),
            ClickKind::Middle => Command::click(MouseButton::Middle),
            ClickKind::Double => Command::MouseClick(ClickRequest {
                button: MouseButton::Left,
                double: Some(true),
            }),
        }
    }

    /// The platform confirmed exclusive pointer lock.
    pub fn lock_acquired(&mut self) {
        self.capture = CaptureState::Locked;
    }

    /// The platform dropped pointer lock. Returns whether it was held.
    pub fn lock_lost(&mut self) -> bool {
        let was_locked = self.capture.is_locked();
        self.capture = CaptureState::Idle;
        self.reset_motion();
        was_locked
    }

    /// A lock request was refused. Later presses use direct capture.
    pub fn lock_failed(&mut self) {
        self.lock_refused = true;
        if !self.capture.is_locked() {
            self.capture = CaptureState::Idle;
        }
    }

    fn lock_available(&self) -> bool {
        !self.lock_refused && self.surface.supports_pointer_lock()
    }

    /// Ask the platform to leave pointer lock. Confirmation arrives as a
    /// lock-change event.
    pub fn exit_lock(&mut self) {
        if matches!(self.capture, CaptureState::Locked | CaptureState::LockRequested) {
            if let Err(e) = self.surface.exit_pointer_lock() {
                warn!(error = %e, "failed to exit pointer lock");
            }
        }
    }

    /// Drop every pending delta, gesture, and captured contact.
    pub fn reset(&mut self) {
        let captured: Vec<PointerId> = self.touches.keys().copied().collect();
        for id in captured {
            self.release_capture(id);
        }
        self.touches.clear();
        self.touch_session = None;
        self.tap = None;
        self.reset_motion();
        if !self.capture.is_locked() {
            self.capture = CaptureState::Idle;
        }
    }

    fn reset_motion(&mut self) {
        self.pending_move = MovementVector::default();
        self.move_frame.cancel();
        self.pending_scroll = ScrollRequest::default();
        self.scroll_frame.cancel();
        self.last_point = Point::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lan_control_input::mock::{MockSurface, MockSurfaceHandle};
    use lan_control_types::SurfaceSize;
    use tokio::time::Duration;

    fn engine_with(surface: MockSurface) -> (PointerEngine, MockSurfaceHandle) {
        let handle = surface.handle();
        let engine = PointerEngine::new(
            Box::new(surface),
            PointerConfig::default(),
            TouchConfig::default(),
        );
        (engine, handle)
    }

    fn touch_engine() -> PointerEngine {
        engine_with(MockSurface::without_pointer_lock(SurfaceSize::new(400.0, 300.0))).0
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn commands(out: &mut Outbox) -> Vec<Command> {
        out.drain()
            .into_iter()
            .filter_map(|e| e.command().cloned())
            .collect()
    }

    #[test]
    fn move_scale_uses_remote_size() {
        let engine = touch_engine();
        // max(1920/400, 1080/300) * 0.9 = 4.8 * 0.9
        let remote = RemoteScreenState::new(1920.0, 1080.0, 0.0, 0.0);
        assert!((engine.move_scale(Some(&remote)) - 4.32).abs() < 1e-9);
        assert!((engine.scroll_scale(Some(&remote)) - 1.944).abs() < 1e-9);
    }

    #[test]
    fn move_scale_clamps() {
        let engine = touch_engine();
        let huge = RemoteScreenState::new(40_000.0, 30_000.0, 0.0, 0.0);
        assert_eq!(engine.move_scale(Some(&huge)), 10.0);
        assert_eq!(engine.scroll_scale(Some(&huge)), 4.5);

        let small = RemoteScreenState::new(100.0, 100.0, 0.0, 0.0);
        assert_eq!(engine.move_scale(Some(&small)), 1.6);
        assert_eq!(engine.scroll_scale(Some(&small)), 1.5);
    }

    #[test]
    fn move_scale_falls_back_to_viewport() {
        let (engine, handle) =
            engine_with(MockSurface::without_pointer_lock(SurfaceSize::new(400.0, 300.0)));
        handle.set_viewport(SurfaceSize::new(1600.0, 900.0));
        // 1600 / 400 * 0.9
        assert!((engine.move_scale(None) - 3.6).abs() < 1e-9);

        handle.set_surface(SurfaceSize::new(0.0, 0.0));
        assert_eq!(engine.move_scale(None), 1.6);
    }

    #[test]
    fn locked_moves_coalesce_per_frame() {
        let (mut engine, _) = engine_with(MockSurface::default());
        let now = Instant::now();
        engine.down(&PointerEvent::mouse(10.0, 10.0), now);
        engine.lock_acquired();

        let mut out = Outbox::default();
        for _ in 0..3 {
            engine.moved(&PointerEvent::mouse(0.0, 0.0).with_movement(2.0, -1.0), None, now);
        }
        engine.poll(now + ms(15), &mut out);
        assert!(out.is_empty());
        engine.poll(now + ms(16), &mut out);
        assert_eq!(
            out.drain(),
            vec![crate::effect::Effect::Request {
                command: Command::MouseMove(MovementVector::new(6.0, -3.0)),
                feedback: Feedback::RemoteState {
                    movement: Some(MovementVector::new(6.0, -3.0))
                },
            }]
        );
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn zero_delta_sends_nothing() {
        let (mut engine, _) = engine_with(MockSurface::default());
        let now = Instant::now();
        engine.down(&PointerEvent::mouse(0.0, 0.0), now);
        engine.lock_acquired();
        let disposition =
            engine.moved(&PointerEvent::mouse(0.0, 0.0).with_movement(0.0, 0.0), None, now);
        assert_eq!(disposition, Disposition::PassThrough);
        assert_eq!(engine.next_deadline(), None);
    }

    #[test]
    fn unlocked_mouse_uses_absolute_positions() {
        let (mut engine, handle) = engine_with(MockSurface::default());
        let now = Instant::now();
        engine.down(&PointerEvent::mouse(100.0, 100.0).with_button(2), now);
        assert_eq!(handle.lock_requests(), 0);
        assert_eq!(engine.capture(), CaptureState::Direct);

        engine.moved(&PointerEvent::mouse(110.0, 95.0), None, now);
        engine.moved(&PointerEvent::mouse(112.0, 95.0), None, now);
        let mut out = Outbox::default();
        engine.poll(now + ms(16), &mut out);
        assert_eq!(
            commands(&mut out),
            vec![Command::MouseMove(MovementVector::new(12.0, -5.0))]
        );
    }

    #[test]
    fn primary_mouse_down_requests_lock() {
        let (mut engine, handle) = engine_with(MockSurface::default());
        engine.down(&PointerEvent::mouse(0.0, 0.0), Instant::now());
        assert_eq!(handle.lock_requests(), 1);
        assert_eq!(engine.capture(), CaptureState::LockRequested);
        assert!(handle.captured().is_empty());
    }

    #[test]
    fn denied_lock_falls_back_to_direct_capture() {
        let (mut engine, handle) = engine_with(MockSurface::default());
        handle.deny_lock();
        engine.down(&PointerEvent::mouse(0.0, 0.0), Instant::now());
        assert_eq!(engine.capture(), CaptureState::Direct);
        assert_eq!(handle.captured(), vec![PointerId(1)]);
    }

    #[test]
    fn double_click_window() {
        let (mut engine, _) = engine_with(MockSurface::default());
        let start = Instant::now();
        let mut out = Outbox::default();
        let mut click_at = |engine: &mut PointerEngine, at: Instant, button: i16| {
            let event = PointerEvent::mouse(0.0, 0.0).with_button(button);
            engine.down(&event, at);
            engine.up(&event, at, &mut out).click
        };
        let double = |double| {
            Some(Command::MouseClick(ClickRequest {
                button: MouseButton::Left,
                double: Some(double),
            }))
        };

        assert_eq!(click_at(&mut engine, start, 0), double(false));
        assert_eq!(click_at(&mut engine, start + ms(319), 0), double(true));
        assert_eq!(click_at(&mut engine, start + ms(640), 0), double(false));

        let right = click_at(&mut engine, start + ms(700), 2);
        let right_again = click_at(&mut engine, start + ms(710), 2);
        let single_right = Some(Command::MouseClick(ClickRequest {
            button: MouseButton::Right,
            double: Some(false),
        }));
        assert_eq!(right, single_right);
        assert_eq!(right_again, single_right);

        assert_eq!(click_at(&mut engine, start + ms(800), 1), None);
    }

    #[test]
    fn unlocked_release_releases_keys() {
        let (mut engine, _) = engine_with(MockSurface::default());
        let now = Instant::now();
        let event = PointerEvent::mouse(0.0, 0.0).with_button(2);
        engine.down(&event, now);
        let release = engine.up(&event, now, &mut Outbox::default());
        assert!(release.release_keys);
        assert_eq!(engine.capture(), CaptureState::Idle);
    }

    #[test]
    fn locked_release_keeps_keys() {
        let (mut engine, _) = engine_with(MockSurface::default());
        let now = Instant::now();
        let event = PointerEvent::mouse(0.0, 0.0);
        engine.down(&event, now);
        engine.lock_acquired();
        let release = engine.up(&event, now, &mut Outbox::default());
        assert!(!release.release_keys);
        assert!(release.click.is_some());
        assert!(engine.is_locked());
    }

    #[test]
    fn quick_touch_is_a_tap() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        engine.down(&PointerEvent::touch(1, 50.0, 50.0), now);
        engine.up(&PointerEvent::touch(1, 55.0, 58.0), now + ms(100), &mut out);
        assert_eq!(commands(&mut out), vec![Command::click(MouseButton::Left)]);
    }

    #[test]
    fn slow_or_long_touch_is_not_a_tap() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        engine.down(&PointerEvent::touch(1, 50.0, 50.0), now);
        engine.up(&PointerEvent::touch(1, 50.0, 50.0), now + ms(220), &mut out);
        assert!(commands(&mut out).is_empty());

        engine.down(&PointerEvent::touch(2, 50.0, 50.0), now + ms(500));
        engine.up(&PointerEvent::touch(2, 65.0, 55.0), now + ms(550), &mut out);
        assert!(commands(&mut out).is_empty());
    }

    #[test]
    fn pen_tap() {
        let (mut engine, handle) = engine_with(MockSurface::default());
        let now = Instant::now();
        let mut out = Outbox::default();
        engine.down(&PointerEvent::pen(10.0, 10.0), now);
        assert_eq!(handle.lock_requests(), 0);
        let release = engine.up(&PointerEvent::pen(12.0, 10.0), now + ms(50), &mut out);
        assert_eq!(commands(&mut out), vec![Command::click(MouseButton::Left)]);
        assert_eq!(release.click, None);
    }

    fn two_finger_tap(travel: f64) -> Vec<Command> {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        engine.down(&PointerEvent::touch(1, 100.0, 100.0), now);
        engine.down(&PointerEvent::touch(2, 200.0, 100.0), now + ms(10));
        engine.moved(&PointerEvent::touch(1, 100.0, 100.0 + travel / 2.0), None, now + ms(190));
        engine.moved(&PointerEvent::touch(2, 200.0, 100.0 + travel / 2.0), None, now + ms(195));
        engine.up(&PointerEvent::touch(1, 100.0, 100.0), now + ms(198), &mut out);
        engine.up(&PointerEvent::touch(2, 200.0, 100.0), now + ms(200), &mut out);
        engine.poll(now + ms(400), &mut out);
        commands(&mut out)
    }

    #[test]
    fn two_finger_tap_right_clicks_once() {
        assert_eq!(two_finger_tap(50.0), vec![Command::click(MouseButton::Right)]);
    }

    #[test]
    fn two_finger_drag_is_not_a_tap() {
        let sent = two_finger_tap(300.0);
        assert!(sent
            .iter()
            .all(|command| matches!(command, Command::MouseScroll(_))));
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn three_finger_tap_middle_clicks() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        for id in 1..=3 {
            engine.down(&PointerEvent::touch(id, 10.0 * f64::from(id), 10.0), now);
        }
        for id in 1..=3 {
            let event = PointerEvent::touch(id, 10.0 * f64::from(id), 10.0);
            engine.up(&event, now + ms(100), &mut out);
        }
        assert_eq!(commands(&mut out), vec![Command::click(MouseButton::Middle)]);
    }

    #[test]
    fn four_finger_tap_does_nothing() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        for id in 1..=4 {
            engine.down(&PointerEvent::touch(id, 10.0, 10.0), now);
        }
        for id in 1..=4 {
            engine.up(&PointerEvent::touch(id, 10.0, 10.0), now + ms(100), &mut out);
        }
        assert!(commands(&mut out).is_empty());
    }

    #[test]
    fn two_finger_move_scrolls_with_inverted_vertical() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        let remote = RemoteScreenState::new(100.0, 100.0, 0.0, 0.0);
        engine.down(&PointerEvent::touch(1, 0.0, 0.0), now);
        engine.down(&PointerEvent::touch(2, 50.0, 0.0), now);
        engine.moved(&PointerEvent::touch(1, 2.0, 10.0), Some(&remote), now);
        engine.poll(now + ms(16), &mut out);
        // scroll scale clamps to 1.5 for a small remote screen
        assert_eq!(
            commands(&mut out),
            vec![Command::MouseScroll(ScrollRequest {
                horizontal: 3.0,
                vertical: -15.0,
            })]
        );
    }

    #[test]
    fn one_finger_move_scales() {
        let mut engine = touch_engine();
        let now = Instant::now();
        let mut out = Outbox::default();
        let remote = RemoteScreenState::new(100.0, 100.0, 0.0, 0.0);
        engine.down(&PointerEvent::touch(1, 0.0, 0.0), now);
        engine.moved(&PointerEvent::touch(1, 10.0, 5.0), Some(&remote), now);
        engine.poll(now + ms(16), &mut out);
        assert_eq!(
            commands(&mut out),
            vec![Command::MouseMove(MovementVector::new(16.0, 8.0))]
        );
    }

    #[test]
    fn wheel_inverts_vertical() {
        let mut out = Outbox::default();
        PointerEngine::wheel(
            &WheelEvent {
                delta_x: 4.0,
                delta_y: 12.0,
            },
            &mut out,
        );
        PointerEngine::wheel(&WheelEvent::default(), &mut out);
        assert_eq!(
            commands(&mut out),
            vec![Command::MouseScroll(ScrollRequest {
                horizontal: 4.0,
                vertical: -12.0,
            })]
        );
    }

    #[test]
    fn explicit_double_click_button() {
        assert_eq!(
            PointerEngine::click_button(ClickKind::Double),
            Command::MouseClick(ClickRequest {
                button: MouseButton::Left,
                double: Some(true),
            })
        );
        assert_eq!(
            PointerEngine::click_button(ClickKind::Middle),
            Command::click(MouseButton::Middle)
        );
    }

    #[test]
    fn idle_moves_pass_through() {
        let mut engine = touch_engine();
        let disposition = engine.moved(&PointerEvent::mouse(5.0, 5.0), None, Instant::now());
        assert_eq!(disposition, Disposition::PassThrough);
    }

    #[test]
    fn refused_lock_falls_back_to_direct_capture() {
        let (mut engine, surface) = engine_with(MockSurface::default());
        let now = Instant::now();
        let press = PointerEvent::mouse(10.0, 10.0);
        engine.down(&press, now);
        assert_eq!(engine.capture(), CaptureState::LockRequested);
        engine.lock_failed();
        engine.reset();
        assert_eq!(engine.capture(), CaptureState::Idle);

        engine.down(&press, now);
        assert_eq!(surface.lock_requests(), 1);
        assert_eq!(engine.capture(), CaptureState::Direct);
        assert_eq!(surface.captured(), vec![PointerId(1)]);
    }
}
