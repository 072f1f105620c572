//! Integration tests driving a full controller against the mock host.
//!
//! Time is paused, so frame and release timers fire as soon as every task
//! is idle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lan_control_clipboard::mock::{MockClipboard, MockClipboardHandle};
use lan_control_clipboard::DeviceItem;
use lan_control_engine::{
    CaptureState, ClipboardSync, Config, Controller, ControllerHandle, EngineStatus,
    SessionEngine,
};
use lan_control_input::mock::{MockSurface, MockSurfaceHandle};
use lan_control_protocol::mock::{MockChannel, MockChannelHandle};
use lan_control_protocol::{CommandChannel, ProtocolError};
use lan_control_types::{
    ClipboardContent, ClipboardOrigin, Command, InputEvent, KeyAction, KeyEvent, Modifiers,
    MovementVector, PointerEvent, RemoteScreenState, Reply, SystemAction,
};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

struct TestController {
    handle: ControllerHandle,
    host: MockChannelHandle,
    surface: MockSurfaceHandle,
    device: MockClipboardHandle,
}

/// A host that takes `delay` to answer every command.
struct SlowHost {
    inner: MockChannel,
    delay: Duration,
}

#[async_trait]
impl CommandChannel for SlowHost {
    async fn send(&self, command: Command) -> Result<Reply, ProtocolError> {
        tokio::time::sleep(self.delay).await;
        self.inner.send(command).await
    }
}

fn start(screen: RemoteScreenState) -> TestController {
    let host = MockChannel::with_screen(screen);
    let host_handle = host.handle();
    start_on(Arc::new(host), host_handle)
}

fn start_on(channel: Arc<dyn CommandChannel>, host_handle: MockChannelHandle) -> TestController {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let config = Config::default();
    let surface = MockSurface::default();
    let surface_handle = surface.handle();
    let device = MockClipboard::default();
    let device_handle = device.handle();

    let engine = SessionEngine::new(&config, Box::new(surface));
    let clipboard = ClipboardSync::new(
        Some(Arc::new(device)),
        channel.clone(),
        config.clipboard.max_size,
    );
    let controller = Controller::new(engine, channel, clipboard, Some("admin".to_string()));

    TestController {
        handle: controller.spawn(),
        host: host_handle,
        surface: surface_handle,
        device: device_handle,
    }
}

fn screen() -> RemoteScreenState {
    RemoteScreenState::new(1000.0, 800.0, 500.0, 400.0)
}

/// Wait for a condition on a status receiver with timeout.
async fn wait_for_status(
    rx: &mut watch::Receiver<EngineStatus>,
    timeout: Duration,
    pred: impl Fn(&EngineStatus) -> bool,
) -> Result<EngineStatus, &'static str> {
    tokio::time::timeout(timeout, async {
        loop {
            {
                let status = rx.borrow_and_update().clone();
                if pred(&status) {
                    return Ok(status);
                }
            }
            if rx.changed().await.is_err() {
                return Err("watch closed");
            }
        }
    })
    .await
    .map_err(|_| "timeout")?
}

impl TestController {
    async fn input(&self, event: InputEvent) {
        self.handle.send_input(event).await.unwrap();
    }

    async fn lock(&self) {
        self.input(InputEvent::PointerDown(PointerEvent::mouse(10.0, 10.0)))
            .await;
        self.input(InputEvent::PointerLockChanged(true)).await;
        let mut status = self.handle.subscribe();
        wait_for_status(&mut status, Duration::from_secs(1), |s| {
            s.capture == CaptureState::Locked && s.remote.is_some()
        })
        .await
        .expect("controller should lock");
    }

    async fn key_down(&self, key: &str) {
        self.input(InputEvent::KeyDown(KeyEvent::new(key))).await;
    }

    fn sent_since(&self, mark: usize) -> Vec<Command> {
        self.host.sent().into_iter().skip(mark).collect()
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn test_locked_moves_are_coalesced() {
    let test = start(screen());
    test.lock().await;
    assert_eq!(test.surface.lock_requests(), 1);
    let mark = test.host.sent().len();

    for _ in 0..3 {
        test.input(InputEvent::PointerMove(
            PointerEvent::mouse(0.0, 0.0).with_movement(5.0, -2.0),
        ))
        .await;
    }
    settle().await;

    assert_eq!(
        test.sent_since(mark),
        vec![Command::MouseMove(MovementVector::new(15.0, -6.0))]
    );
    let status = test.handle.status();
    assert_eq!(status.remote, Some(RemoteScreenState::new(1000.0, 800.0, 515.0, 394.0)));

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_edge_release_hands_control_back() {
    let test = start(RemoteScreenState::new(1000.0, 800.0, 0.0, 400.0));
    test.lock().await;
    test.key_down("a").await;
    test.host.set_clipboard(Some(ClipboardContent::text("from host")));

    test.input(InputEvent::PointerMove(
        PointerEvent::mouse(0.0, 0.0).with_movement(-60.0, 0.0),
    ))
    .await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(test.surface.lock_exits(), 1);
    assert!(test
        .host
        .sent()
        .contains(&Command::key("a", KeyAction::Up)));

    // The platform confirms the lock is gone; the host clipboard is mirrored.
    test.input(InputEvent::PointerLockChanged(false)).await;
    let mut status = test.handle.subscribe();
    let status = wait_for_status(&mut status, Duration::from_secs(1), |s| {
        s.clipboard.is_some()
    })
    .await
    .expect("clipboard preview should update");
    assert_eq!(status.capture, CaptureState::Idle);
    assert_eq!(
        status.clipboard.map(|preview| preview.origin),
        Some(ClipboardOrigin::Host)
    );
    assert_eq!(test.device.writes(), vec![DeviceItem::Text("from host".into())]);

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_paste_pushes_clipboard_before_key() {
    let test = start(screen());
    test.lock().await;
    settle().await;
    test.device.set_items(vec![DeviceItem::Text("hello".into())]);
    let mark = test.host.sent().len();

    test.input(InputEvent::KeyDown(
        KeyEvent::new("v").with_modifiers(Modifiers::ctrl()),
    ))
    .await;
    settle().await;

    assert_eq!(
        test.sent_since(mark),
        vec![
            Command::ClipboardSet(ClipboardContent::text("hello")),
            Command::key("v", KeyAction::Press),
        ]
    );
    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_copy_pulls_after_delay() {
    let test = start(screen());
    test.lock().await;
    settle().await;
    test.host.set_clipboard(Some(ClipboardContent::text("copied")));
    let mark = test.host.sent().len();

    test.input(InputEvent::KeyDown(
        KeyEvent::new("c").with_modifiers(Modifiers::meta()),
    ))
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(test.sent_since(mark), vec![Command::key("c", KeyAction::Press)]);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(
        test.sent_since(mark),
        vec![Command::key("c", KeyAction::Press), Command::ClipboardGet]
    );
    assert_eq!(test.device.writes(), vec![DeviceItem::Text("copied".into())]);

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_modifier_auto_release() {
    let test = start(screen());
    test.key_down("Alt").await;
    let mut status = test.handle.subscribe();
    wait_for_status(&mut status, Duration::from_secs(1), |s| {
        !s.held_modifiers.is_empty()
    })
    .await
    .expect("alt should be held");

    let status = wait_for_status(&mut status, Duration::from_secs(10), |s| {
        s.held_modifiers.is_empty()
    })
    .await
    .expect("alt should auto-release");
    assert!(status.running);
    assert!(test
        .host
        .sent()
        .ends_with(&[Command::key("alt", KeyAction::Up)]));

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_system_action_failure_alerts() {
    let test = start(screen());
    test.host.fail("system/shutdown");
    test.input(InputEvent::System(SystemAction::Shutdown)).await;

    let mut status = test.handle.subscribe();
    let status = wait_for_status(&mut status, Duration::from_secs(1), |s| s.alert.is_some())
        .await
        .expect("failure should raise an alert");
    assert!(status.alert.unwrap().contains("system/shutdown failed"));
    assert!(status.running);

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_loss_stops_controller() {
    let test = start(screen());
    test.lock().await;
    test.key_down("Shift").await;
    settle().await;

    test.host.expire_session();
    test.key_down("x").await;

    let mut status = test.handle.subscribe();
    let status = wait_for_status(&mut status, Duration::from_secs(1), |s| !s.running)
        .await
        .expect("controller should stop");
    assert!(status.session_lost);
    assert!(status.held_modifiers.is_empty());
    assert!(status.active_keys.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_held_input() {
    let test = start(screen());
    test.lock().await;
    test.key_down("Shift").await;
    test.key_down("w").await;
    settle().await;
    let mark = test.host.sent().len();

    let TestController { handle, host, .. } = test;
    handle.shutdown().await;

    let sent: Vec<Command> = host.sent().into_iter().skip(mark).collect();
    assert_eq!(
        sent,
        vec![
            Command::key("w", KeyAction::Up),
            Command::key("shift", KeyAction::Up),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_slow_host_does_not_build_a_backlog() {
    let host = MockChannel::with_screen(screen());
    let host_handle = host.handle();
    let slow = SlowHost {
        inner: host,
        delay: Duration::from_millis(100),
    };
    let test = start_on(Arc::new(slow), host_handle);
    test.lock().await;
    let mark = test.host.sent().len();

    for _ in 0..60 {
        test.input(InputEvent::PointerMove(
            PointerEvent::mouse(0.0, 0.0).with_movement(1.0, 0.0),
        ))
        .await;
        tokio::time::sleep(Duration::from_millis(17)).await;
    }
    let input_ended = Instant::now();

    let moves = |sent: Vec<Command>| -> Vec<MovementVector> {
        sent.into_iter()
            .filter_map(|command| match command {
                Command::MouseMove(movement) => Some(movement),
                _ => None,
            })
            .collect()
    };
    let delivered = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let dx: f64 = moves(test.sent_since(mark)).iter().map(|m| m.dx).sum();
            if dx >= 60.0 {
                return Instant::now();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("every move should reach the host");

    // Motion trails the input by about one round trip, not by the backlog.
    assert!(delivered - input_ended <= Duration::from_millis(300));
    let sent = moves(test.sent_since(mark));
    assert!(sent.len() < 30, "{} move commands", sent.len());
    assert_eq!(sent.iter().map(|m| m.dx).sum::<f64>(), 60.0);

    test.handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_host_keeps_key_order() {
    let host = MockChannel::with_screen(screen());
    let host_handle = host.handle();
    let slow = SlowHost {
        inner: host,
        delay: Duration::from_millis(100),
    };
    let test = start_on(Arc::new(slow), host_handle);
    test.lock().await;
    let mark = test.host.sent().len();

    test.key_down("q").await;
    test.input(InputEvent::PointerMove(
        PointerEvent::mouse(0.0, 0.0).with_movement(2.0, 0.0),
    ))
    .await;
    test.input(InputEvent::KeyUp(KeyEvent::new("q"))).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let keys: Vec<Command> = test
        .sent_since(mark)
        .into_iter()
        .filter(|command| matches!(command, Command::Key(_)))
        .collect();
    assert_eq!(
        keys,
        vec![
            Command::key("q", KeyAction::Down),
            Command::key("q", KeyAction::Up),
        ]
    );

    test.handle.shutdown().await;
}
