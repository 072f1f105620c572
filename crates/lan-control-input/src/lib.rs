//! Local input handling for lan-control.
//!
//! [`keymap`] maps physical key identities to the host's canonical key
//! names. [`CaptureSurface`] abstracts the element that captures the pointer
//! (exclusive pointer lock where supported, direct capture otherwise).

use lan_control_types::{PointerId, SurfaceSize};

pub mod error;
pub mod keymap;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::InputError;
pub use keymap::{canonical_key_name, modifier_key, normalize, special_key, Modifier};

/// The local surface that captures pointer input.
///
/// Implementations wrap whatever the host platform offers. When exclusive
/// pointer lock is not supported, callers fall back to direct capture of the
/// individual pointer and track absolute positions instead of deltas.
pub trait CaptureSurface: Send + 'static {
    /// Whether exclusive pointer lock is available at all.
    fn supports_pointer_lock(&self) -> bool;

    /// Ask for exclusive pointer lock.
    ///
    /// Success only means the request was issued: the lock is confirmed
    /// later by a lock-change event, or refused by a lock-error event.
    fn request_pointer_lock(&mut self) -> Result<(), InputError>;

    /// Leave exclusive pointer lock. Best effort.
    fn exit_pointer_lock(&mut self) -> Result<(), InputError>;

    /// Route all events of `id` to this surface until released.
    fn set_pointer_capture(&mut self, id: PointerId) -> Result<(), InputError>;

    /// Stop routing events of `id` to this surface.
    fn release_pointer_capture(&mut self, id: PointerId) -> Result<(), InputError>;

    /// Rendered size of the capture area.
    fn surface_size(&self) -> SurfaceSize;

    /// Size of the whole local viewport.
    fn viewport_size(&self) -> SurfaceSize;
}
