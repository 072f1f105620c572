//! Pointer capture state machine.

/// How the capture surface currently holds the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing captured; pointer moves are ignored.
    #[default]
    Idle,
    /// A pointer is captured directly and absolute positions are tracked.
    Direct,
    /// Exclusive lock requested, waiting for the platform to confirm.
    LockRequested,
    /// Exclusive lock held; device deltas are forwarded.
    Locked,
}

impl CaptureState {
    /// Whether pointer moves are being translated.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub fn is_locked(self) -> bool {
        self == Self::Locked
    }

    /// Whether a new lock request makes sense.
    pub fn can_request_lock(self) -> bool {
        matches!(self, Self::Idle | Self::Direct)
    }
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Direct => write!(f, "Direct"),
            Self::LockRequested => write!(f, "LockRequested"),
            Self::Locked => write!(f, "Locked"),
        }
    }
}

/// Whether the host should suppress its default handling of an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The engine acted on the event.
    Consumed,
    /// The engine ignored the event; default handling applies.
    PassThrough,
}

impl Disposition {
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}
