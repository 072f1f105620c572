//! Mock capture surface for testing.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use lan_control_types::{PointerId, SurfaceSize};

use crate::error::InputError;
use crate::CaptureSurface;

/// Shared state for observing what `MockSurface` was asked to do.
#[derive(Debug)]
struct MockSurfaceState {
    supports_lock: bool,
    deny_lock: bool,
    lock_requests: u32,
    lock_exits: u32,
    captured: BTreeSet<PointerId>,
    surface: SurfaceSize,
    viewport: SurfaceSize,
}

/// Mock capture surface.
///
/// Lock requests are recorded but never confirmed; tests deliver the
/// lock-change event themselves.
pub struct MockSurface {
    state: Arc<Mutex<MockSurfaceState>>,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self::new(SurfaceSize::new(400.0, 300.0))
    }
}

impl MockSurface {
    /// A surface of the given size that supports pointer lock.
    pub fn new(surface: SurfaceSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockSurfaceState {
                supports_lock: true,
                deny_lock: false,
                lock_requests: 0,
                lock_exits: 0,
                captured: BTreeSet::new(),
                surface,
                viewport: surface,
            })),
        }
    }

    /// A surface without pointer lock support (touch devices).
    pub fn without_pointer_lock(surface: SurfaceSize) -> Self {
        let mock = Self::new(surface);
        mock.state.lock().unwrap().supports_lock = false;
        mock
    }

    /// Get a clonable handle for observing the surface from tests.
    pub fn handle(&self) -> MockSurfaceHandle {
        MockSurfaceHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockSurface`.
#[derive(Clone)]
pub struct MockSurfaceHandle {
    state: Arc<Mutex<MockSurfaceState>>,
}

impl MockSurfaceHandle {
    pub fn lock_requests(&self) -> u32 {
        self.state.lock().unwrap().lock_requests
    }

    pub fn lock_exits(&self) -> u32 {
        self.state.lock().unwrap().lock_exits
    }

    /// Pointers currently captured directly.
    pub fn captured(&self) -> Vec<PointerId> {
        self.state.lock().unwrap().captured.iter().copied().collect()
    }

    /// Refuse subsequent lock requests synchronously.
    pub fn deny_lock(&self) {
        self.state.lock().unwrap().deny_lock = true;
    }

    pub fn set_viewport(&self, viewport: SurfaceSize) {
        self.state.lock().unwrap().viewport = viewport;
    }

    pub fn set_surface(&self, surface: SurfaceSize) {
        self.state.lock().unwrap().surface = surface;
    }
}

impl CaptureSurface for MockSurface {
    fn supports_pointer_lock(&self) -> bool {
        self.state.lock().unwrap().supports_lock
    }

    fn request_pointer_lock(&mut self) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        if !state.supports_lock {
            return Err(InputError::PointerLockUnsupported);
        }
        if state.deny_lock {
            return Err(InputError::PointerLockDenied);
        }
        state.lock_requests += 1;
        Ok(())
    }

    fn exit_pointer_lock(&mut self) -> Result<(), InputError> {
        self.state.lock().unwrap().lock_exits += 1;
        Ok(())
    }

    fn set_pointer_capture(&mut self, id: PointerId) -> Result<(), InputError> {
        self.state.lock().unwrap().captured.insert(id);
        Ok(())
    }

    fn release_pointer_capture(&mut self, id: PointerId) -> Result<(), InputError> {
        self.state.lock().unwrap().captured.remove(&id);
        Ok(())
    }

    fn surface_size(&self) -> SurfaceSize {
        self.state.lock().unwrap().surface
    }

    fn viewport_size(&self) -> SurfaceSize {
        self.state.lock().unwrap().viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_capture_and_lock_requests() {
        let mut surface = MockSurface::default();
        let handle = surface.handle();
        surface.request_pointer_lock().unwrap();
        surface.set_pointer_capture(PointerId(3)).unwrap();
        assert_eq!(handle.lock_requests(), 1);
        assert_eq!(handle.captured(), vec![PointerId(3)]);
        surface.release_pointer_capture(PointerId(3)).unwrap();
        assert!(handle.captured().is_empty());
    }

    #[test]
    fn lock_failures() {
        let mut touch = MockSurface::without_pointer_lock(SurfaceSize::new(10.0, 10.0));
        assert!(matches!(
            touch.request_pointer_lock(),
            Err(InputError::PointerLockUnsupported)
        ));

        let mut surface = MockSurface::default();
        surface.handle().deny_lock();
        assert!(matches!(
            surface.request_pointer_lock(),
            Err(InputError::PointerLockDenied)
        ));
    }
}
