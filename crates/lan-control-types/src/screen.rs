//! Host screen state and movement types.

use serde::{Deserialize, Serialize};

/// Screen bounds and absolute cursor position as reported by the host.
///
/// Values are in host pixel space. The host sends plain JSON numbers, so
/// every field is an `f64` and missing fields default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteScreenState {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl RemoteScreenState {
    #[must_use]
    pub fn new(width: f64, height: f64, x: f64, y: f64) -> Self {
        Self {
            width,
            height,
            x,
            y,
        }
    }

    /// Whether the host reported usable (positive) screen dimensions.
    #[must_use]
    pub fn has_bounds(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Check whether the cursor sits within `buffer` pixels of a screen edge.
    #[must_use]
    pub fn is_at_edge(&self, edge: ScreenEdge, buffer: f64) -> bool {
        match edge {
            ScreenEdge::Left => self.x <= buffer,
            ScreenEdge::Right => self.x >= self.width - buffer,
            ScreenEdge::Top => self.y <= buffer,
            ScreenEdge::Bottom => self.y >= self.height - buffer,
        }
    }

    /// The screen dimension measured along the axis perpendicular to `edge`.
    #[must_use]
    pub fn span(&self, edge: ScreenEdge) -> f64 {
        match edge {
            ScreenEdge::Left | ScreenEdge::Right => self.width,
            ScreenEdge::Top | ScreenEdge::Bottom => self.height,
        }
    }
}

/// A relative pointer movement, as sent in a `mouse/move` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementVector {
    pub dx: f64,
    pub dy: f64,
}

impl MovementVector {
    #[must_use]
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// How far this movement pushes into `edge`.
    ///
    /// Positive values push toward the edge, negative values pull away.
    #[must_use]
    pub fn push_into(&self, edge: ScreenEdge) -> f64 {
        match edge {
            ScreenEdge::Left => -self.dx,
            ScreenEdge::Right => self.dx,
            ScreenEdge::Top => -self.dy,
            ScreenEdge::Bottom => self.dy,
        }
    }
}

impl std::ops::AddAssign for MovementVector {
    fn add_assign(&mut self, rhs: Self) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

/// Which edge of the remote screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl ScreenEdge {
    pub const ALL: [ScreenEdge; 4] = [Self::Left, Self::Right, Self::Top, Self::Bottom];
}

impl std::fmt::Display for ScreenEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Top => write!(f, "top"),
            Self::Bottom => write!(f, "bottom"),
        }
    }
}

/// Rendered size of a local surface (capture area or viewport), in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    #[must_use]
    pub fn longest_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parses_partial_json() {
        let state: RemoteScreenState =
            serde_json::from_str(r#"{"width":1920,"height":1080,"x":4}"#).unwrap();
        assert_eq!(state, RemoteScreenState::new(1920.0, 1080.0, 4.0, 0.0));
        assert!(state.has_bounds());
    }

    #[test]
    fn zero_dimensions_have_no_bounds() {
        assert!(!RemoteScreenState::default().has_bounds());
        assert!(!RemoteScreenState::new(1920.0, 0.0, 0.0, 0.0).has_bounds());
    }

    #[test]
    fn is_at_edge_uses_buffer() {
        let state = RemoteScreenState::new(1920.0, 1080.0, 2.0, 1078.0);
        assert!(state.is_at_edge(ScreenEdge::Left, 2.0));
        assert!(!state.is_at_edge(ScreenEdge::Left, 1.0));
        assert!(state.is_at_edge(ScreenEdge::Bottom, 2.0));
        assert!(!state.is_at_edge(ScreenEdge::Top, 2.0));
        assert!(!state.is_at_edge(ScreenEdge::Right, 2.0));
    }

    #[test]
    fn push_into_signs() {
        let movement = MovementVector::new(-5.0, 3.0);
        assert_eq!(movement.push_into(ScreenEdge::Left), 5.0);
        assert_eq!(movement.push_into(ScreenEdge::Right), -5.0);
        assert_eq!(movement.push_into(ScreenEdge::Top), -3.0);
        assert_eq!(movement.push_into(ScreenEdge::Bottom), 3.0);
    }
}
