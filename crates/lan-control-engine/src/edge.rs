//! Edge-release detection.
//!
//! While the pointer is locked, the host cursor is pinned to its screen and
//! cannot leave it on its own. When the user keeps pushing against an edge
//! for a while, control is handed back to the local device: each edge has a
//! counter of how far the user pushed into it since the cursor reached it,
//! capped at a threshold. A full counter arms a short release timer; any
//! update that does not keep a counter full cancels it.

use lan_control_types::{MovementVector, RemoteScreenState, ScreenEdge};
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::config::PointerConfig;
use crate::timer::Timer;

#[derive(Debug)]
pub struct EdgeTracker {
    accumulators: [f64; 4],
    release: Timer,
    ratio: f64,
    buffer: f64,
    delay: Duration,
}

fn index(edge: ScreenEdge) -> usize {
    match edge {
        ScreenEdge::Left => 0,
        ScreenEdge::Right => 1,
        ScreenEdge::Top => 2,
        ScreenEdge::Bottom => 3,
    }
}

impl EdgeTracker {
    pub fn new(config: &PointerConfig) -> Self {
        Self {
            accumulators: [0.0; 4],
            release: Timer::default(),
            ratio: config.edge_release_ratio,
            buffer: config.edge_buffer_px,
            delay: config.edge_release_delay(),
        }
    }

    /// Feed a state report from the host, paired with the movement that
    /// produced it (`None` for a plain state poll).
    pub fn update(
        &mut self,
        state: &RemoteScreenState,
        movement: Option<MovementVector>,
        locked: bool,
        now: Instant,
    ) {
        if !state.has_bounds() || !locked {
            self.reset();
            return;
        }
        let movement = movement.unwrap_or_default();
        let mut release_ready = false;

        for edge in ScreenEdge::ALL {
            let threshold = self.threshold(state, edge);
            let counter = &mut self.accumulators[index(edge)];
            if !state.is_at_edge(edge, self.buffer) {
                *counter = 0.0;
                continue;
            }
            let push = movement.push_into(edge);
            if push > 0.0 {
                *counter = (*counter + push).min(threshold);
            } else if push < 0.0 {
                *counter = 0.0;
            }
            if *counter >= threshold {
                release_ready = true;
            }
        }

        if release_ready {
            if self.release.arm_if_idle(now, self.delay) {
                debug!(accumulators = ?self.accumulators, "edge release armed");
            }
        } else {
            self.release.cancel();
        }
    }

    /// Release threshold for an edge: a fraction of the screen dimension,
    /// never less than the edge buffer.
    pub fn threshold(&self, state: &RemoteScreenState, edge: ScreenEdge) -> f64 {
        (state.span(edge) * self.ratio).max(self.buffer)
    }

    /// Clear all counters and cancel a pending release.
    pub fn reset(&mut self) {
        self.accumulators = [0.0; 4];
        self.release.cancel();
    }

    /// Returns `true` once when the release timer fires. Counters are reset.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.release.take_if_due(now) {
            self.reset();
            return true;
        }
        false
    }

    pub fn accumulator(&self, edge: ScreenEdge) -> f64 {
        self.accumulators[index(edge)]
    }

    pub fn is_release_pending(&self) -> bool {
        self.release.is_armed()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.release.deadline()
    }
}
