#![forbid(unsafe_code)]

//! DOM-independent pieces of the binding: event names, notification
//! payloads, option parsing, and raw DOM value mapping.
//!
//! Everything here compiles natively so it can be tested without a browser.

use serde::Serialize;

use scrolljack_core::host::ListenerKind;
use scrolljack_core::{DeltaMode, Result, ScrollJackConfig, TouchPhase, WheelInput};

/// `window` event fired with every delivered progress value.
pub const PROGRESS_EVENT: &str = "scrolljack-progress";

/// `window` event fired with every lock change.
pub const LOCK_EVENT: &str = "scrolljack-lock";

/// Detail key carrying the monitored element.
pub const DETAIL_TARGET: &str = "target";

/// `detail` of a [`PROGRESS_EVENT`], minus the target element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDetail {
    pub progress: f64,
}

/// `detail` of a [`LOCK_EVENT`], minus the target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDetail {
    pub is_locked: bool,
}

/// A controller callback waiting to be delivered to JavaScript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    Progress(f64),
    Lock(bool),
}

impl Notification {
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Progress(_) => PROGRESS_EVENT,
            Self::Lock(_) => LOCK_EVENT,
        }
    }

    /// JSON `detail` payload without the target.
    #[must_use]
    pub fn detail_json(&self) -> String {
        let json = match *self {
            Self::Progress(progress) => serde_json::to_string(&ProgressDetail { progress }),
            Self::Lock(is_locked) => serde_json::to_string(&LockDetail { is_locked }),
        };
        json.unwrap_or_else(|_| "{}".to_string())
    }
}

/// Notifications queued while the controller is borrowed.
///
/// Controller callbacks only append here; JavaScript runs once the borrow is
/// released, so user code may call back into the controller.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Notification>,
}

impl Outbox {
    pub fn post(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Parse the JSON-serialized options object. `None` means defaults.
pub fn parse_options(json: Option<&str>) -> Result<ScrollJackConfig> {
    match json.map(str::trim) {
        None | Some("" | "null" | "undefined") => Ok(ScrollJackConfig::default()),
        Some(json) => ScrollJackConfig::from_json(json),
    }
}

/// `WheelEvent.deltaY` / `deltaMode` to controller input.
#[must_use]
pub const fn wheel_input(delta_y: f64, delta_mode: u32) -> WheelInput {
    WheelInput {
        delta_y,
        mode: DeltaMode::from_dom(delta_mode),
    }
}

/// Touch phase delivered by a touch listener.
#[must_use]
pub const fn touch_phase(kind: ListenerKind) -> Option<TouchPhase> {
    match kind {
        ListenerKind::TouchStart => Some(TouchPhase::Start),
        ListenerKind::TouchMove => Some(TouchPhase::Move),
        ListenerKind::TouchEnd => Some(TouchPhase::End),
        ListenerKind::TouchCancel => Some(TouchPhase::Cancel),
        _ => None,
    }
}
