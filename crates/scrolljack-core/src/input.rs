#![forbid(unsafe_code)]

//! Normalized input events the controller consumes.
//!
//! Hosts translate platform events (DOM `WheelEvent`, `TouchEvent`,
//! `KeyboardEvent`, `scroll`, `resize`) into [`InputEvent`] and act on the
//! returned [`Disposition`].

use serde::{Deserialize, Serialize};

use crate::host::ListenerKind;

/// Pixels per line for line-mode wheel deltas.
pub const LINE_HEIGHT_PX: f64 = 16.0;

/// Unit of a wheel delta (`WheelEvent.deltaMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    /// Map the DOM `deltaMode` constant. Unknown values read as pixels.
    #[must_use]
    pub const fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

/// Vertical wheel input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    /// Positive scrolls down the page.
    pub delta_y: f64,
    pub mode: DeltaMode,
}

impl WheelInput {
    /// Pixel-mode wheel input.
    #[must_use]
    pub const fn pixels(delta_y: f64) -> Self {
        Self {
            delta_y,
            mode: DeltaMode::Pixel,
        }
    }

    /// Delta converted to pixels. Page mode scrolls one viewport height.
    #[must_use]
    pub fn pixel_delta(&self, viewport_height: f64) -> f64 {
        match self.mode {
            DeltaMode::Pixel => self.delta_y,
            DeltaMode::Line => self.delta_y * LINE_HEIGHT_PX,
            DeltaMode::Page => self.delta_y * viewport_height,
        }
    }
}

/// Phase for touch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Touch input for the primary touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    /// `clientY` of the first touch; ignored for `End` / `Cancel`.
    pub y: f64,
}

/// Normalized key, from DOM `KeyboardEvent.key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Char(char),
    Other(Box<str>),
}

impl KeyCode {
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other(key.into()),
                }
            }
        }
    }
}

/// Input delivered by a host listener.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Wheel(WheelInput),
    Touch(TouchInput),
    Key(KeyCode),
    Scroll,
    Resize,
}

impl InputEvent {
    #[must_use]
    pub const fn wheel(delta_y: f64) -> Self {
        Self::Wheel(WheelInput::pixels(delta_y))
    }

    #[must_use]
    pub const fn touch_start(y: f64) -> Self {
        Self::Touch(TouchInput {
            phase: TouchPhase::Start,
            y,
        })
    }

    #[must_use]
    pub const fn touch_move(y: f64) -> Self {
        Self::Touch(TouchInput {
            phase: TouchPhase::Move,
            y,
        })
    }

    #[must_use]
    pub const fn touch_end() -> Self {
        Self::Touch(TouchInput {
            phase: TouchPhase::End,
            y: 0.0,
        })
    }

    #[must_use]
    pub const fn touch_cancel() -> Self {
        Self::Touch(TouchInput {
            phase: TouchPhase::Cancel,
            y: 0.0,
        })
    }

    #[must_use]
    pub fn key(key: &str) -> Self {
        Self::Key(KeyCode::from_dom_key(key))
    }

    /// Listener this event arrives through.
    #[must_use]
    pub const fn listener_kind(&self) -> ListenerKind {
        match self {
            Self::Wheel(_) => ListenerKind::Wheel,
            Self::Touch(t) => match t.phase {
                TouchPhase::Start => ListenerKind::TouchStart,
                TouchPhase::Move => ListenerKind::TouchMove,
                TouchPhase::End => ListenerKind::TouchEnd,
                TouchPhase::Cancel => ListenerKind::TouchCancel,
            },
            Self::Key(_) => ListenerKind::KeyDown,
            Self::Scroll => ListenerKind::Scroll,
            Self::Resize => ListenerKind::Resize,
        }
    }
}

/// What the host must do with an event after the controller saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Let the platform handle it natively.
    PassThrough,
    /// Call `preventDefault()` and `stopPropagation()`.
    Consumed,
}

impl Disposition {
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}
