//! Keyboard dispatch.
//!
//! Decides for every key event whether it becomes a held key (down/up pair),
//! a single press, typed text, or is left to the local surface. Modifiers
//! are tracked separately so they can be released on focus loss.

use std::collections::BTreeSet;

use lan_control_input::{modifier_key, normalize, special_key, Modifier};
use lan_control_types::{Command, FieldInput, KeyAction, KeyEvent, KeyTarget, Modifiers};
use tokio::time::{Duration, Instant};
use tracing::debug;

use crate::config::{ClipboardConfig, KeyboardConfig};
use crate::effect::{Effect, Outbox};
use crate::modifiers::ModifierTracker;
use crate::state::Disposition;
use crate::timer::{earliest, Timer};

pub struct KeyboardDispatch {
    modifiers: ModifierTracker,
    /// Canonical names of keys held down on the host.
    active: BTreeSet<&'static str>,
    clipboard_pull: Timer,
    pull_delay: Duration,
    clipboard_enabled: bool,
}

impl KeyboardDispatch {
    pub fn new(keyboard: &KeyboardConfig, clipboard: &ClipboardConfig) -> Self {
        Self {
            modifiers: ModifierTracker::new(keyboard.modifier_release()),
            active: BTreeSet::new(),
            clipboard_pull: Timer::default(),
            pull_delay: clipboard.pull_delay(),
            clipboard_enabled: clipboard.enabled,
        }
    }

    pub fn key_down(
        &mut self,
        event: &KeyEvent,
        locked: bool,
        now: Instant,
        out: &mut Outbox,
    ) -> Disposition {
        match event.target {
            KeyTarget::BatchField => Disposition::PassThrough,
            KeyTarget::RealtimeField => self.field_key_down(event, now, out),
            KeyTarget::Document => self.document_key_down(event, locked, now, out),
        }
    }

    pub fn key_up(&mut self, event: &KeyEvent, out: &mut Outbox) -> Disposition {
        if let Some(modifier) = modifier_key(&event.key) {
            if event.target == KeyTarget::BatchField {
                return Disposition::PassThrough;
            }
            out.extend(self.modifiers.up(modifier));
            return Disposition::Consumed;
        }
        if event.target != KeyTarget::Document {
            return Disposition::PassThrough;
        }
        match normalize(&event.key) {
            Some(name) if self.active.remove(name) => {
                out.send(Command::key(name, KeyAction::Up));
                Disposition::Consumed
            }
            _ => Disposition::PassThrough,
        }
    }

    /// Modifiers, special keys, and shortcuts. `None` when the key is
    /// none of those.
    fn common_key_down(
        &mut self,
        event: &KeyEvent,
        now: Instant,
        out: &mut Outbox,
    ) -> Option<Disposition> {
        if let Some(modifier) = modifier_key(&event.key) {
            out.extend(self.modifiers.down(modifier, now));
            return Some(Disposition::Consumed);
        }
        if let Some(name) = special_key(&event.key) {
            out.send(Command::key(name, KeyAction::Press));
            return Some(Disposition::Consumed);
        }
        let name = normalize(&event.key)?;
        if !event.modifiers.is_combo() {
            return None;
        }
        // Combos fire on the leading edge only.
        if !event.repeat {
            self.shortcut(name, event, now, out);
        }
        Some(Disposition::Consumed)
    }

    fn shortcut(&mut self, name: &'static str, event: &KeyEvent, now: Instant, out: &mut Outbox) {
        let press = Command::key(name, KeyAction::Press);
        let clipboard = self.clipboard_enabled && event.modifiers.is_shortcut();
        match name {
            "v" if clipboard => {
                debug!("paste shortcut, pushing device clipboard first");
                out.push(Effect::ClipboardPush { then: Some(press) });
            }
            "c" | "x" if clipboard => {
                out.send(press);
                self.clipboard_pull.arm(now, self.pull_delay);
            }
            _ => out.send(press),
        }
    }

    fn document_key_down(
        &mut self,
        event: &KeyEvent,
        locked: bool,
        now: Instant,
        out: &mut Outbox,
    ) -> Disposition {
        if let Some(disposition) = self.common_key_down(event, now, out) {
            return disposition;
        }
        if locked {
            if let Some(name) = normalize(&event.key) {
                if !event.repeat && self.active.insert(name) {
                    out.send(Command::key(name, KeyAction::Down));
                }
                return Disposition::Consumed;
            }
        }
        if is_typable(event) {
            out.send(Command::type_text(event.key.clone()));
            return Disposition::Consumed;
        }
        Disposition::PassThrough
    }

    fn field_key_down(&mut self, event: &KeyEvent, now: Instant, out: &mut Outbox) -> Disposition {
        self.common_key_down(event, now, out)
            .unwrap_or(Disposition::PassThrough)
    }

    /// Text and edits from the realtime field.
    pub fn field_input(input: &FieldInput, out: &mut Outbox) {
        match input {
            FieldInput::Insert(text) | FieldInput::CompositionEnd(text) => {
                if !text.is_empty() {
                    out.send(Command::type_text(text.clone()));
                }
            }
            FieldInput::DeleteBackward => out.send(Command::key("backspace", KeyAction::Press)),
            FieldInput::DeleteForward => out.send(Command::key("delete", KeyAction::Press)),
            FieldInput::LineBreak => out.send(Command::key("enter", KeyAction::Press)),
        }
    }

    /// Text submitted from the batch field.
    pub fn batch_submit(text: &str, out: &mut Outbox) {
        if !text.is_empty() {
            out.send(Command::type_text(text));
        }
    }

    /// Keep modifiers that are still physically down from auto-releasing.
    pub fn refresh_modifiers(&mut self, flags: Modifiers, now: Instant) {
        let down = [
            (Modifier::Shift, flags.shift),
            (Modifier::Ctrl, flags.ctrl),
            (Modifier::Alt, flags.alt),
            (Modifier::Command, flags.meta),
        ];
        for (modifier, is_down) in down {
            if is_down {
                self.modifiers.refresh(modifier, now);
            }
        }
    }

    /// Release every held key, then every held modifier.
    pub fn release_all(&mut self, out: &mut Outbox) {
        let keys = std::mem::take(&mut self.active);
        out.extend(
            keys.into_iter()
                .map(|name| Command::key(name, KeyAction::Up)),
        );
        out.extend(self.modifiers.release_all());
    }

    pub fn poll(&mut self, now: Instant, out: &mut Outbox) {
        out.extend(self.modifiers.poll(now));
        if self.clipboard_pull.take_if_due(now) {
            out.push(Effect::ClipboardPull { mirror: true });
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([self.modifiers.next_deadline(), self.clipboard_pull.deadline()])
    }

    pub fn held_modifiers(&self) -> Vec<Modifier> {
        self.modifiers.held()
    }

    pub fn active_keys(&self) -> Vec<&'static str> {
        self.active.iter().copied().collect()
    }
}

/// A single printable character with no chord modifiers, outside of an IME
/// composition.
fn is_typable(event: &KeyEvent) -> bool {
    let mut chars = event.key.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_control())
        && !event.modifiers.is_combo()
        && !event.composing
}
