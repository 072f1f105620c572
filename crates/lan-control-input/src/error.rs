//! Input subsystem errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("pointer lock is not supported by this surface")]
    PointerLockUnsupported,

    #[error("pointer lock request was denied")]
    PointerLockDenied,

    #[error("capture surface not available")]
    Unavailable,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
