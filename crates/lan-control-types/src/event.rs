//! Local input events.
//!
//! Platform-agnostic representations of the pointer, keyboard, text-field,
//! and window events a host surface feeds into the session engine.

use crate::command::SystemAction;

/// Identifier of one pointer contact (mouse, pen, or a single finger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i32);

/// Class of device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// A position in local client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point.
    #[must_use]
    pub fn manhattan(&self, other: Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Modifier flags carried on an input event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    #[must_use]
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    #[must_use]
    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    #[must_use]
    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    /// Ctrl, Alt, or Meta is down (Shift alone does not make a combo).
    #[must_use]
    pub fn is_combo(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }

    /// Ctrl or Meta is down, the modifiers used for clipboard shortcuts.
    #[must_use]
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer down, move, up, or cancel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerKind,
    /// Button code: 0 primary, 1 auxiliary, 2 secondary.
    pub button: i16,
    /// Absolute client position.
    pub position: Point,
    /// Device-reported movement since the previous event (meaningful while locked).
    pub movement_x: f64,
    pub movement_y: f64,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    #[must_use]
    pub fn new(id: PointerId, kind: PointerKind, position: Point) -> Self {
        Self {
            id,
            kind,
            button: 0,
            position,
            movement_x: 0.0,
            movement_y: 0.0,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub fn mouse(x: f64, y: f64) -> Self {
        Self::new(PointerId(1), PointerKind::Mouse, Point::new(x, y))
    }

    #[must_use]
    pub fn touch(id: i32, x: f64, y: f64) -> Self {
        Self::new(PointerId(id), PointerKind::Touch, Point::new(x, y))
    }

    #[must_use]
    pub fn pen(x: f64, y: f64) -> Self {
        Self::new(PointerId(1), PointerKind::Pen, Point::new(x, y))
    }

    #[must_use]
    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_movement(mut self, dx: f64, dy: f64) -> Self {
        self.movement_x = dx;
        self.movement_y = dy;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Where a key event was dispatched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyTarget {
    /// The document (trackpad or page body).
    #[default]
    Document,
    /// The composition-aware realtime text field.
    RealtimeField,
    /// The batch text field submitted as a whole.
    BatchField,
}

/// A key down or key up event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key identity as reported by the platform (`"a"`, `"Enter"`, `"Shift"`).
    pub key: String,
    pub repeat: bool,
    /// Part of an IME composition.
    pub composing: bool,
    pub modifiers: Modifiers,
    pub target: KeyTarget,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            repeat: false,
            composing: false,
            modifiers: Modifiers::NONE,
            target: KeyTarget::Document,
        }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    #[must_use]
    pub fn composing(mut self) -> Self {
        self.composing = true;
        self
    }

    #[must_use]
    pub fn on(mut self, target: KeyTarget) -> Self {
        self.target = target;
        self
    }
}

/// A wheel event, in the platform's delta units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
}

/// A contribution from the realtime text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    /// Text inserted outside of a composition.
    Insert(String),
    /// A finished IME composition.
    CompositionEnd(String),
    DeleteBackward,
    DeleteForward,
    LineBreak,
}

/// On-screen click buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickKind {
    Left,
    Right,
    Middle,
    Double,
}

/// Everything the host surface can feed into a session.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerCancel(PointerEvent),
    Wheel(WheelEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// Contribution from the realtime text field.
    Field(FieldInput),
    /// The realtime text field lost focus.
    FieldBlur,
    /// The batch text field was submitted.
    BatchSubmit(String),
    ClickButton(ClickKind),
    System(SystemAction),
    /// The surface gained (`true`) or lost (`false`) exclusive pointer lock.
    PointerLockChanged(bool),
    PointerLockError,
    /// The window lost focus.
    Blur,
    VisibilityChanged { hidden: bool },
    HelpOpened,
}
