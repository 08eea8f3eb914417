#![forbid(unsafe_code)]

//! The boundary between the controller and its environment.
//!
//! A [`Host`] answers geometry queries, schedules "before next repaint"
//! callbacks, and owns global listener registrations. The controller never
//! touches platform APIs directly. Hosts deliver fired frames back through
//! [`ScrollJackController::run_frame`](crate::ScrollJackController::run_frame)
//! and listener events through
//! [`ScrollJackController::handle_event`](crate::ScrollJackController::handle_event).

use crate::geometry::{OffsetMetrics, RegionRect, Viewport};

/// Identifies one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Identifies one global listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u64);

impl ListenerToken {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Global events the controller listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    KeyDown,
    Scroll,
    Resize,
}

impl ListenerKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 8] = [
        Self::Wheel,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::TouchCancel,
        Self::KeyDown,
        Self::Scroll,
        Self::Resize,
    ];

    /// DOM event type name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::KeyDown => "keydown",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
        }
    }

    /// Registration options for this kind.
    ///
    /// Wheel and touch listeners must be able to cancel the event; scroll,
    /// resize, and `touchcancel` (which cannot be cancelled) only observe.
    #[must_use]
    pub const fn options(self) -> ListenerOptions {
        match self {
            Self::Wheel | Self::TouchStart | Self::TouchMove | Self::TouchEnd => {
                ListenerOptions { passive: false }
            }
            Self::TouchCancel | Self::Scroll | Self::Resize => ListenerOptions { passive: true },
            Self::KeyDown => ListenerOptions { passive: false },
        }
    }
}

/// Listener registration options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerOptions {
    pub passive: bool,
}

/// Environment the controller runs in.
///
/// Implementations must be cheap to query: geometry is read on every input
/// event and every activation frame.
pub trait Host {
    /// Target bounds relative to the viewport.
    fn bounding_rect(&self) -> RegionRect;

    /// Target placement in page coordinates.
    fn offset_metrics(&self) -> OffsetMetrics;

    /// Viewport height and current page scroll.
    fn viewport(&self) -> Viewport;

    /// Whether the user asked the platform for reduced motion.
    ///
    /// Consulted once, at construction.
    fn prefers_reduced_motion(&self) -> bool;

    /// Schedule a single callback before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a callback that has not fired yet. Unknown handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Register a global listener.
    fn add_listener(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerToken;

    /// Remove a listener registered by [`Host::add_listener`].
    fn remove_listener(&mut self, token: ListenerToken);
}
