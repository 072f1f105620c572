//! Held-modifier tracking with self-healing auto-release.
//!
//! A modifier whose key-up never arrives (focus stolen mid-chord, a dropped
//! event) would stay down on the host indefinitely. Every held modifier
//! carries a deadline; if it passes, the modifier is released on the host.

use std::collections::BTreeMap;

use lan_control_input::Modifier;
use lan_control_types::{Command, KeyAction};
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::timer::{earliest, Timer};

#[derive(Debug)]
pub struct ModifierTracker {
    held: BTreeMap<Modifier, Timer>,
    release_after: Duration,
}

impl ModifierTracker {
    pub fn new(release_after: Duration) -> Self {
        Self {
            held: BTreeMap::new(),
            release_after,
        }
    }

    /// Modifier pressed. Sends a down only on the first press; every press
    /// restarts the auto-release timer.
    pub fn down(&mut self, modifier: Modifier, now: Instant) -> Option<Command> {
        let newly_held = !self.held.contains_key(&modifier);
        self.held
            .entry(modifier)
            .or_default()
            .arm(now, self.release_after);
        newly_held.then(|| Command::key(modifier.as_str(), KeyAction::Down))
    }

    /// Modifier released. No-op when it is not held.
    pub fn up(&mut self, modifier: Modifier) -> Option<Command> {
        self.held
            .remove(&modifier)
            .map(|_| Command::key(modifier.as_str(), KeyAction::Up))
    }

    /// Restart the timer of a held modifier (e.g. while dragging with it down).
    pub fn refresh(&mut self, modifier: Modifier, now: Instant) {
        if let Some(timer) = self.held.get_mut(&modifier) {
            timer.arm(now, self.release_after);
        }
    }

    pub fn release_all(&mut self) -> Vec<Command> {
        let held: Vec<Modifier> = self.held.keys().copied().collect();
        held.into_iter().filter_map(|m| self.up(m)).collect()
    }

    /// Release every modifier whose timer has expired.
    pub fn poll(&mut self, now: Instant) -> Vec<Command> {
        let expired: Vec<Modifier> = self
            .held
            .iter_mut()
            .filter_map(|(modifier, timer)| timer.take_if_due(now).then_some(*modifier))
            .collect();
        expired
            .into_iter()
            .filter_map(|modifier| {
                debug!(%modifier, "auto-releasing modifier");
                self.up(modifier)
            })
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.held.values().map(Timer::deadline))
    }

    pub fn is_held(&self, modifier: Modifier) -> bool {
        self.held.contains_key(&modifier)
    }

    pub fn held(&self) -> Vec<Modifier> {
        self.held.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELEASE: Duration = Duration::from_secs(8);

    fn down(name: &str) -> Command {
        Command::key(name, KeyAction::Down)
    }

    fn up(name: &str) -> Command {
        Command::key(name, KeyAction::Up)
    }

    #[test]
    fn down_then_up() {
        let now = Instant::now();
        let mut tracker = ModifierTracker::new(RELEASE);
        assert_eq!(tracker.down(Modifier::Shift, now), Some(down("shift")));
        assert!(tracker.is_held(Modifier::Shift));
        assert_eq!(tracker.up(Modifier::Shift), Some(up("shift")));
        assert!(tracker.is_empty());
        assert_eq!(tracker.up(Modifier::Shift), None);
        assert_eq!(tracker.next_deadline(), None);
    }

    #[test]
    fn auto_release_after_timeout() {
        let now = Instant::now();
        let mut tracker = ModifierTracker::new(RELEASE);
        tracker.down(Modifier::Ctrl, now);
        assert!(tracker.poll(now + RELEASE - Duration::from_millis(1)).is_empty());
        assert_eq!(tracker.poll(now + RELEASE), vec![up("ctrl")]);
        assert!(tracker.is_empty());
    }

    #[test]
    fn repeated_down_restarts_timer_without_resending() {
        let now = Instant::now();
        let mut tracker = ModifierTracker::new(RELEASE);
        assert!(tracker.down(Modifier::Alt, now).is_some());
        let later = now + Duration::from_secs(5);
        assert_eq!(tracker.down(Modifier::Alt, later), None);
        assert!(tracker.poll(now + RELEASE).is_empty());
        assert_eq!(tracker.poll(later + RELEASE), vec![up("alt")]);
    }

    #[test]
    fn refresh_only_affects_held_modifiers() {
        let now = Instant::now();
        let mut tracker = ModifierTracker::new(RELEASE);
        tracker.refresh(Modifier::Shift, now);
        assert!(tracker.is_empty());

        tracker.down(Modifier::Shift, now);
        tracker.refresh(Modifier::Shift, now + Duration::from_secs(4));
        assert_eq!(
            tracker.next_deadline(),
            Some(now + Duration::from_secs(4) + RELEASE)
        );
    }

    #[test]
    fn release_all_sends_one_up_each() {
        let now = Instant::now();
        let mut tracker = ModifierTracker::new(RELEASE);
        tracker.down(Modifier::Command, now);
        tracker.down(Modifier::Shift, now);
        let released = tracker.release_all();
        assert_eq!(released.len(), 2);
        assert!(released.contains(&up("command")));
        assert!(released.contains(&up("shift")));
        assert!(tracker.is_empty());
        assert!(tracker.release_all().is_empty());
    }
}
