#![forbid(unsafe_code)]

//! The scroll-jack state machine.
//!
//! [`ScrollJackController`] owns progress, activation, and lock state for one
//! monitored region and decides, per input event, whether the event is
//! consumed (page scroll suppressed) or passed through.
//!
//! # Invariants
//!
//! 1. `progress` stays in `[0, 1]`; non-finite values never reach it.
//! 2. `locked` implies `enabled` and `active`.
//! 3. At progress 1 the lock is released so the page can scroll on. At 0 the
//!    lock holds for forward input and is released once a backward input
//!    passes through natively.
//! 4. Apart from that release at 0, the lock is a function of activation and
//!    progress: [`unlock`](ScrollJackController::unlock) drops it only until
//!    the next re-derivation.
//! 5. Activation is recomputed before any wheel or touch event is interpreted.
//! 6. `on_progress` fires at most once per frame with the latest value.
//! 7. After [`destroy`](ScrollJackController::destroy) no callback fires and
//!    every listener and frame acquired from the host has been released.
//!
//! # Failure Modes
//!
//! None at runtime. A region with no height scales deltas against
//! [`FALLBACK_HEIGHT_PX`](crate::geometry::FALLBACK_HEIGHT_PX); NaN or
//! infinite deltas pass through untouched.

use crate::config::{INITIAL_PROGRESS_SPAN, PROGRESS_EPSILON, ScrollJackConfig};
use crate::error::{Result, ScrollJackError};
use crate::geometry::{self, DOMINANT_OVERLAP};
use crate::host::{FrameHandle, Host, ListenerKind, ListenerToken};
use crate::input::{Disposition, InputEvent, KeyCode, TouchPhase};
use crate::snapshot::ScrollJackSnapshot;

/// Receives progress in `[0, 1]`.
pub type ProgressCallback = Box<dyn FnMut(f64)>;

/// Receives the new lock state.
pub type LockCallback = Box<dyn FnMut(bool)>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Builder for a [`ScrollJackController`].
///
/// `on_progress` is mandatory; [`build`](Self::build) fails without it.
#[derive(Default)]
pub struct ScrollJackOptions {
    config: ScrollJackConfig,
    on_progress: Option<ProgressCallback>,
    on_lock_change: Option<LockCallback>,
}

impl std::fmt::Debug for ScrollJackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollJackOptions")
            .field("config", &self.config)
            .field("on_progress", &self.on_progress.is_some())
            .field("on_lock_change", &self.on_lock_change.is_some())
            .finish()
    }
}

impl ScrollJackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: ScrollJackConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn sensitivity(mut self, sensitivity: f64) -> Self {
        self.config.sensitivity = sensitivity;
        self
    }

    #[must_use]
    pub fn activation_threshold(mut self, threshold: f64) -> Self {
        self.config.activation_threshold = threshold;
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn on_lock_change(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_lock_change = Some(Box::new(callback));
        self
    }

    /// Validate the options and attach a controller to `host`.
    ///
    /// When enabled, this registers the global listeners, runs one activation
    /// check, and arms the per-frame activation loop.
    pub fn build<H: Host>(self, host: H) -> Result<ScrollJackController<H>> {
        let on_progress = self
            .on_progress
            .ok_or(ScrollJackError::MissingProgressCallback)?;
        self.config.validate()?;

        let reduced_motion = host.prefers_reduced_motion();
        #[cfg(feature = "tracing")]
        if reduced_motion && self.config.enabled {
            tracing::debug!("reduced motion preferred; scroll-jack disabled");
        }

        let mut controller = ScrollJackController {
            host,
            config: self.config,
            on_progress,
            on_lock_change: self.on_lock_change,
            progress: 0.0,
            active: false,
            locked: false,
            enabled: self.config.enabled && !reduced_motion,
            reduced_motion,
            release: None,
            touch: TouchTracker::default(),
            progress_frame: None,
            activation_frame: None,
            listeners: Vec::with_capacity(ListenerKind::ALL.len()),
            disposed: false,
        };
        controller.init();
        Ok(controller)
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Why the lock is released while the region is still active and progress
/// is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Release {
    /// A backward input passed through at progress 0. Cleared once progress
    /// moves forward again or the region deactivates.
    AtStart,
}

/// Scratch state for one touch gesture.
#[derive(Debug, Clone, Copy, Default)]
struct TouchTracker {
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    start_y: f64,
    last_y: f64,
    touching: bool,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Scroll-jack controller for one region.
///
/// Feed it host events with [`handle_event`](Self::handle_event) and fired
/// frames with [`run_frame`](Self::run_frame).
pub struct ScrollJackController<H: Host> {
    host: H,
    config: ScrollJackConfig,
    on_progress: ProgressCallback,
    on_lock_change: Option<LockCallback>,

    progress: f64,
    active: bool,
    locked: bool,
    enabled: bool,
    reduced_motion: bool,
    release: Option<Release>,
    touch: TouchTracker,

    // Pending coalesced on_progress delivery.
    progress_frame: Option<FrameHandle>,
    // Self-rescheduling activation check.
    activation_frame: Option<FrameHandle>,
    listeners: Vec<ListenerToken>,
    disposed: bool,
}

impl<H: Host> std::fmt::Debug for ScrollJackController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollJackController")
            .field("progress", &self.progress)
            .field("active", &self.active)
            .field("locked", &self.locked)
            .field("enabled", &self.enabled)
            .field("release", &self.release)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl<H: Host> ScrollJackController<H> {
    // -- Public operations --------------------------------------------------

    /// Current progress.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether native scroll is currently suppressed.
    #[must_use]
    pub fn is_scroll_locked(&self) -> bool {
        self.locked
    }

    /// Whether the region currently accepts controlled input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn config(&self) -> &ScrollJackConfig {
        &self.config
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Force progress to `value` (clamped), re-deriving the lock and
    /// notifying as needed. Non-finite values are ignored.
    pub fn set_progress(&mut self, value: f64) {
        if self.disposed {
            return;
        }
        self.update_progress(value);
    }

    /// Release the lock.
    ///
    /// Progress at or past a boundary is pinned to it; mid-range progress is
    /// left alone. `on_lock_change(false)` fires unconditionally. The next
    /// activation check or progress update re-derives the lock, so input
    /// inside an active region engages it again.
    pub fn unlock(&mut self) {
        if self.disposed {
            return;
        }
        if self.progress <= 0.0 {
            self.update_progress(0.0);
        } else if self.progress >= 1.0 {
            self.update_progress(1.0);
        }
        #[cfg(feature = "tracing")]
        if self.locked {
            tracing::debug!(progress = self.progress, "scroll lock released manually");
        }
        self.locked = false;
        self.emit_lock(false);
    }

    /// Toggle the kill switch. Disabling unlocks and stops the activation
    /// loop; enabling installs listeners if they were never installed.
    ///
    /// A reduced-motion preference seen at construction keeps the controller
    /// disabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.disposed {
            #[cfg(feature = "tracing")]
            tracing::warn!("set_enabled called on a destroyed scroll-jack controller");
            return;
        }
        if enabled && self.reduced_motion {
            #[cfg(feature = "tracing")]
            tracing::debug!("reduced motion preferred; ignoring enable request");
            return;
        }
        self.enabled = enabled;
        if enabled {
            if self.listeners.is_empty() {
                self.init();
            } else {
                self.check_activation();
                self.arm_activation_loop();
            }
        } else {
            self.unlock();
            self.active = false;
            self.release = None;
            self.touch = TouchTracker::default();
            if let Some(handle) = self.activation_frame.take() {
                self.host.cancel_frame(handle);
            }
        }
    }

    /// Release every listener and pending frame. Idempotent.
    pub fn destroy(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for token in self.listeners.drain(..) {
            self.host.remove_listener(token);
        }
        if let Some(handle) = self.progress_frame.take() {
            self.host.cancel_frame(handle);
        }
        if let Some(handle) = self.activation_frame.take() {
            self.host.cancel_frame(handle);
        }
        self.locked = false;
        self.touch = TouchTracker::default();
        #[cfg(feature = "tracing")]
        tracing::debug!(progress = self.progress, "scroll-jack controller destroyed");
    }

    /// Serializable view of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ScrollJackSnapshot {
        ScrollJackSnapshot {
            progress: self.progress,
            active: self.active,
            locked: self.locked,
            enabled: self.enabled,
            destroyed: self.disposed,
            release: self.release,
            touching: self.touch.touching,
            listeners: self.listeners.len(),
            progress_frame_pending: self.progress_frame.is_some(),
            activation_loop_armed: self.activation_frame.is_some(),
        }
    }

    // -- Host entry points ---------------------------------------------------

    /// Interpret one host event.
    pub fn handle_event(&mut self, event: &InputEvent) -> Disposition {
        if self.disposed {
            return Disposition::PassThrough;
        }
        let disposition = match event {
            InputEvent::Wheel(wheel) => {
                self.check_activation();
                let delta = wheel.pixel_delta(self.host.viewport().height);
                self.apply_delta(delta)
            }
            InputEvent::Touch(touch) => match touch.phase {
                TouchPhase::Start => self.on_touch_start(touch.y),
                TouchPhase::Move => self.on_touch_move(touch.y),
                TouchPhase::End | TouchPhase::Cancel => {
                    self.touch.touching = false;
                    Disposition::PassThrough
                }
            },
            InputEvent::Key(key) => {
                if *key == KeyCode::Escape && self.locked {
                    self.unlock();
                }
                Disposition::PassThrough
            }
            InputEvent::Scroll | InputEvent::Resize => {
                self.check_activation();
                if self.enabled && self.is_nearby() {
                    self.arm_activation_loop();
                }
                Disposition::PassThrough
            }
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(
            ?event,
            ?disposition,
            progress = self.progress,
            locked = self.locked,
            "scroll-jack input"
        );
        disposition
    }

    /// Deliver a frame the host scheduled through [`Host::request_frame`].
    pub fn run_frame(&mut self, handle: FrameHandle) {
        if self.disposed {
            return;
        }
        if self.progress_frame == Some(handle) {
            self.progress_frame = None;
            let progress = self.progress;
            (self.on_progress)(progress);
        } else if self.activation_frame == Some(handle) {
            self.activation_frame = None;
            if !self.enabled {
                return;
            }
            self.check_activation();
            if self.active || self.is_nearby() {
                self.arm_activation_loop();
            } else {
                #[cfg(feature = "tracing")]
                tracing::trace!("region out of range; activation loop parked");
            }
        } else {
            #[cfg(feature = "tracing")]
            tracing::trace!(frame = handle.id(), "ignoring stale frame");
        }
    }

    // -- Internals -----------------------------------------------------------

    fn init(&mut self) {
        if !self.enabled || self.disposed || !self.listeners.is_empty() {
            return;
        }
        for kind in ListenerKind::ALL {
            let token = self.host.add_listener(kind, kind.options());
            self.listeners.push(token);
        }
        self.check_activation();
        self.arm_activation_loop();
    }

    fn arm_activation_loop(&mut self) {
        if self.activation_frame.is_none() && !self.disposed {
            self.activation_frame = Some(self.host.request_frame());
        }
    }

    fn is_nearby(&self) -> bool {
        geometry::is_nearby(self.host.bounding_rect(), self.host.viewport().height)
    }

    fn check_activation(&mut self) {
        if !self.enabled || self.disposed {
            return;
        }
        let rect = self.host.bounding_rect();
        let viewport = self.host.viewport();
        let overlap = geometry::overlap_ratio(rect, viewport.height);
        let centered = geometry::is_centered(rect, viewport.height);

        let was_active = self.active;
        self.active = overlap >= self.config.activation_threshold
            && (centered || overlap > DOMINANT_OVERLAP);

        #[cfg(feature = "tracing")]
        if was_active != self.active {
            tracing::debug!(active = self.active, overlap, centered, "scroll-jack activation changed");
        }

        if !was_active && self.active && self.progress <= 0.0 {
            // Seed from the scroll position so a fast scroll past the region
            // top does not snap back to 0.
            let offset = self.host.offset_metrics();
            if viewport.scroll_y > offset.top {
                let span = offset.effective_height() * INITIAL_PROGRESS_SPAN;
                self.update_progress(((viewport.scroll_y - offset.top) / span).min(1.0));
            }
        }

        if was_active && !self.active {
            self.release = None;
        }

        self.sync_lock();
    }

    fn on_touch_start(&mut self, y: f64) -> Disposition {
        self.check_activation();
        // Gestures that begin outside an active region are never tracked.
        if !self.enabled || !self.active || !y.is_finite() {
            self.touch = TouchTracker::default();
            return Disposition::PassThrough;
        }
        self.touch = TouchTracker {
            start_y: y,
            last_y: y,
            touching: true,
        };
        Disposition::PassThrough
    }

    fn on_touch_move(&mut self, y: f64) -> Disposition {
        self.check_activation();
        if !self.enabled || !self.touch.touching || !y.is_finite() {
            return Disposition::PassThrough;
        }
        // Swiping up reads as a positive (scroll-down) delta.
        let delta = self.touch.last_y - y;
        self.touch.last_y = y;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            delta,
            travelled = self.touch.start_y - y,
            "touch move"
        );
        self.apply_delta(delta)
    }

    /// Shared wheel/touch interpretation. `delta` is in pixels, positive
    /// moving forward.
    fn apply_delta(&mut self, delta: f64) -> Disposition {
        if !self.enabled || !self.active || !delta.is_finite() {
            return Disposition::PassThrough;
        }

        // Moving further past a boundary already reached: native scroll.
        if self.progress <= 0.0 && delta <= 0.0 {
            if delta < 0.0 && self.release.is_none() {
                self.release = Some(Release::AtStart);
                self.sync_lock();
            }
            return Disposition::PassThrough;
        }
        if self.progress >= 1.0 && delta >= 0.0 {
            return Disposition::PassThrough;
        }

        let height = self.host.offset_metrics().effective_height();
        let delta_progress = delta * self.config.sensitivity / height;
        self.update_progress(self.progress + delta_progress);
        Disposition::Consumed
    }

    fn update_progress(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::trace!(value, "ignoring non-finite progress");
            return false;
        }
        let clamped = value.clamp(0.0, 1.0);
        let change = (clamped - self.progress).abs();
        let reaches_boundary = (clamped <= 0.0 || clamped >= 1.0) && change > 0.0;
        if change < PROGRESS_EPSILON && !reaches_boundary {
            return false;
        }

        self.progress = clamped;
        if clamped > 0.0 && self.release == Some(Release::AtStart) {
            self.release = None;
        }
        self.sync_lock();
        self.schedule_progress();
        true
    }

    fn schedule_progress(&mut self) {
        if self.progress_frame.is_none() && !self.disposed {
            self.progress_frame = Some(self.host.request_frame());
        }
    }

    fn derive_lock(&self) -> bool {
        if self.disposed || !self.enabled || !self.active {
            return false;
        }
        if !(0.0..1.0).contains(&self.progress) {
            return false;
        }
        match self.release {
            None => true,
            Some(Release::AtStart) => self.progress > 0.0,
        }
    }

    fn sync_lock(&mut self) {
        let locked = self.derive_lock();
        if locked != self.locked {
            self.locked = locked;
            #[cfg(feature = "tracing")]
            tracing::debug!(locked, progress = self.progress, "scroll lock changed");
            self.emit_lock(locked);
        }
    }

    fn emit_lock(&mut self, locked: bool) {
        if self.disposed {
            return;
        }
        if let Some(callback) = self.on_lock_change.as_mut() {
            callback(locked);
        }
    }
}

impl<H: Host> Drop for ScrollJackController<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{CallbackLog, SimHost};

    const VH: f64 = 1200.0;

    /// 1000px region centered in a 1200px viewport, progress 0.
    fn centered() -> (ScrollJackController<SimHost>, CallbackLog) {
        let host = SimHost::new(VH).with_region(2000.0, 1000.0).centered_on_region();
        let log = CallbackLog::new();
        let controller = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        (controller, log)
    }

    #[test]
    fn missing_progress_callback_fails_fast() {
        let err = ScrollJackOptions::new()
            .build(SimHost::new(VH))
            .unwrap_err();
        assert!(matches!(err, ScrollJackError::MissingProgressCallback));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = ScrollJackOptions::new()
            .on_progress(|_| {})
            .sensitivity(f64::NAN)
            .build(SimHost::new(VH))
            .unwrap_err();
        assert!(matches!(err, ScrollJackError::InvalidSensitivity { .. }));
    }

    #[test]
    fn construction_registers_listeners_and_activation_loop() {
        let (c, log) = centered();
        assert_eq!(c.host().listener_count(), ListenerKind::ALL.len());
        assert!(c.is_active());
        assert!(c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true]);
        assert_eq!(c.host().pending_frames(), 1);
    }

    #[test]
    fn wheel_scenario_yields_five_hundredths() {
        let (mut c, log) = centered();
        let d = c.handle_event(&InputEvent::wheel(100.0));
        assert_eq!(d, Disposition::Consumed);
        assert!((c.progress() - 0.05).abs() < 1e-12);
        assert!(log.progress().is_empty(), "delivery waits for the frame");

        crate::sim::advance_frame(&mut c);
        assert_eq!(log.progress().len(), 1);
        assert!((log.progress()[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn overshoot_clamps_to_one_and_unlocks() {
        let (mut c, log) = centered();
        c.set_progress(0.98);
        assert!(c.is_scroll_locked());
        c.handle_event(&InputEvent::wheel(50.0));
        assert_eq!(c.progress(), 1.0);
        assert!(!c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false]);
    }

    #[test]
    fn forward_at_end_passes_through() {
        let (mut c, _log) = centered();
        c.set_progress(1.0);
        assert_eq!(c.handle_event(&InputEvent::wheel(40.0)), Disposition::PassThrough);
        assert_eq!(c.progress(), 1.0);
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn backward_at_end_reengages() {
        let (mut c, log) = centered();
        c.set_progress(1.0);
        assert_eq!(c.handle_event(&InputEvent::wheel(-100.0)), Disposition::Consumed);
        assert!((c.progress() - 0.95).abs() < 1e-12);
        assert!(c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false, true]);
    }

    #[test]
    fn backward_at_start_passes_through_and_releases() {
        let (mut c, log) = centered();
        assert!(c.is_scroll_locked());
        assert_eq!(c.handle_event(&InputEvent::wheel(-30.0)), Disposition::PassThrough);
        assert!(!c.is_scroll_locked());
        assert_eq!(c.snapshot().release, Some(Release::AtStart));
        // Repeated backward input does not flap the lock.
        c.handle_event(&InputEvent::wheel(-30.0));
        assert_eq!(log.locks(), vec![true, false]);

        // Forward input engages again.
        assert_eq!(c.handle_event(&InputEvent::wheel(30.0)), Disposition::Consumed);
        assert!(c.is_scroll_locked());
        assert_eq!(c.snapshot().release, None);
    }

    #[test]
    fn tiny_updates_are_dropped() {
        let (mut c, _log) = centered();
        // 1px * 0.5 / 1000 = 0.0005 < epsilon.
        assert_eq!(c.handle_event(&InputEvent::wheel(1.0)), Disposition::Consumed);
        assert_eq!(c.progress(), 0.0);
        assert_eq!(c.host().pending_frames(), 1, "only the activation loop");
    }

    #[test]
    fn small_step_onto_boundary_is_accepted() {
        let (mut c, _log) = centered();
        c.set_progress(0.9995);
        c.handle_event(&InputEvent::wheel(10.0));
        assert_eq!(c.progress(), 1.0);
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn progress_frames_coalesce_to_latest() {
        let (mut c, log) = centered();
        for _ in 0..5 {
            c.handle_event(&InputEvent::wheel(100.0));
        }
        crate::sim::advance_frame(&mut c);
        assert_eq!(log.progress().len(), 1);
        assert!((log.progress()[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_offset_height_uses_fallback_scale() {
        // Visible 600px box whose layout reports no offset height.
        let host = SimHost::new(VH)
            .with_region(2000.0, 600.0)
            .with_offset_height(0.0)
            .centered_on_region();
        let log = CallbackLog::new();
        let mut c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert!(c.is_active());
        c.handle_event(&InputEvent::wheel(100.0));
        // 100 * 0.5 / 1000, not / 600.
        assert!((c.progress() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn non_finite_delta_passes_through() {
        let (mut c, _log) = centered();
        assert_eq!(
            c.handle_event(&InputEvent::wheel(f64::NAN)),
            Disposition::PassThrough
        );
        assert_eq!(
            c.handle_event(&InputEvent::wheel(f64::INFINITY)),
            Disposition::PassThrough
        );
        assert_eq!(c.progress(), 0.0);
        c.set_progress(f64::NAN);
        assert_eq!(c.progress(), 0.0);
    }

    #[test]
    fn inactive_region_passes_everything_through() {
        let host = SimHost::new(VH).with_region(5000.0, 1000.0);
        let log = CallbackLog::new();
        let mut c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert!(!c.is_active());
        assert_eq!(c.handle_event(&InputEvent::wheel(100.0)), Disposition::PassThrough);
        assert_eq!(c.progress(), 0.0);
        assert!(log.locks().is_empty());
    }

    #[test]
    fn activation_seeds_progress_from_scroll_position() {
        // Region at 1000..2000; user already scrolled 200px past its top.
        let host = SimHost::new(VH).with_region(1000.0, 1000.0).scrolled_to(1200.0);
        let log = CallbackLog::new();
        let c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert!(c.is_active());
        // 200 / (1000 * 0.8)
        assert!((c.progress() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn progress_persists_across_deactivation() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::wheel(200.0));
        let before = c.progress();
        c.host_mut().scroll_y = 10_000.0;
        c.handle_event(&InputEvent::Scroll);
        assert!(!c.is_active());
        assert!(!c.is_scroll_locked());
        c.host_mut().center_on_region();
        c.handle_event(&InputEvent::Scroll);
        assert!(c.is_active());
        assert_eq!(c.progress(), before);
    }

    #[test]
    fn touch_swipe_up_advances() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::touch_start(500.0));
        assert_eq!(c.handle_event(&InputEvent::touch_move(400.0)), Disposition::Consumed);
        assert!((c.progress() - 0.05).abs() < 1e-12);
        c.handle_event(&InputEvent::touch_end());
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(300.0)),
            Disposition::PassThrough,
            "no tracked gesture after touchend"
        );
    }

    #[test]
    fn touch_started_outside_region_is_never_tracked() {
        let host = SimHost::new(VH).with_region(5000.0, 1000.0);
        let log = CallbackLog::new();
        let mut c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert_eq!(c.handle_event(&InputEvent::touch_start(900.0)), Disposition::PassThrough);
        assert!(!c.snapshot().touching);

        // The region scrolls into place mid-gesture.
        c.host_mut().center_on_region();
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(800.0)),
            Disposition::PassThrough
        );
        assert_eq!(c.progress(), 0.0);
        assert!(c.is_active());

        // A fresh gesture inside the active region is tracked.
        c.handle_event(&InputEvent::touch_start(800.0));
        assert_eq!(c.handle_event(&InputEvent::touch_move(700.0)), Disposition::Consumed);
        assert!((c.progress() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn touch_cancel_clears_tracking() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::touch_start(500.0));
        c.handle_event(&InputEvent::touch_cancel());
        assert!(!c.snapshot().touching);
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(400.0)),
            Disposition::PassThrough
        );
    }

    #[test]
    fn wheel_recomputes_activation_without_scroll_event() {
        let host = SimHost::new(VH).with_region(5000.0, 1000.0);
        let log = CallbackLog::new();
        let mut c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert!(!c.is_active());

        // Geometry changes with no scroll or resize event delivered.
        c.host_mut().center_on_region();
        assert_eq!(c.handle_event(&InputEvent::wheel(100.0)), Disposition::Consumed);
        assert!(c.is_active());
        assert!((c.progress() - 0.05).abs() < 1e-12);
        assert!(c.is_scroll_locked());

        c.host_mut().scroll_y = 20_000.0;
        assert_eq!(c.handle_event(&InputEvent::wheel(100.0)), Disposition::PassThrough);
        assert!(!c.is_active());
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn touch_move_recomputes_activation_without_scroll_event() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::touch_start(800.0));

        c.host_mut().scroll_y = 20_000.0;
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(700.0)),
            Disposition::PassThrough
        );
        assert!(!c.is_active());
        assert_eq!(c.progress(), 0.0);

        c.host_mut().center_on_region();
        assert_eq!(c.handle_event(&InputEvent::touch_move(600.0)), Disposition::Consumed);
        assert!(c.is_active());
        assert!((c.progress() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn touch_swipe_down_at_start_passes_through() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::touch_start(300.0));
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(400.0)),
            Disposition::PassThrough
        );
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn escape_unlocks_and_next_wheel_reengages() {
        let (mut c, log) = centered();
        c.set_progress(0.4);
        c.handle_event(&InputEvent::key("Escape"));
        assert!(!c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false]);

        assert_eq!(c.handle_event(&InputEvent::wheel(100.0)), Disposition::Consumed);
        assert!((c.progress() - 0.45).abs() < 1e-12);
        assert!(c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false, true]);
    }

    #[test]
    fn set_progress_after_unlock_rederives_lock() {
        let (mut c, log) = centered();
        c.set_progress(0.4);
        c.unlock();
        assert!(!c.is_scroll_locked());
        c.set_progress(0.6);
        assert!(c.is_active());
        assert!(c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false, true]);
    }

    #[test]
    fn escape_spelled_esc_unlocks() {
        let (mut c, _log) = centered();
        c.handle_event(&InputEvent::key("Esc"));
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn escape_while_unlocked_is_ignored() {
        let (mut c, log) = centered();
        c.set_progress(1.0);
        let locks_before = log.locks().len();
        c.handle_event(&InputEvent::key("Escape"));
        assert_eq!(log.locks().len(), locks_before);
    }

    #[test]
    fn unlock_always_notifies_false() {
        let (mut c, log) = centered();
        c.set_progress(1.0);
        c.unlock();
        c.unlock();
        assert!(!c.is_scroll_locked());
        assert_eq!(log.locks(), vec![true, false, false, false]);
        assert_eq!(c.progress(), 1.0);
    }

    #[test]
    fn unlock_mid_range_keeps_progress() {
        let (mut c, _log) = centered();
        c.set_progress(0.4);
        c.unlock();
        assert_eq!(c.progress(), 0.4);
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn disabling_unlocks_but_keeps_progress() {
        let (mut c, log) = centered();
        c.set_progress(0.3);
        c.set_enabled(false);
        assert!(!c.is_enabled());
        assert!(!c.is_scroll_locked());
        assert_eq!(c.progress(), 0.3);
        assert_eq!(log.locks().last(), Some(&false));
        assert_eq!(c.handle_event(&InputEvent::wheel(100.0)), Disposition::PassThrough);
    }

    #[test]
    fn enabling_late_installs_listeners() {
        let host = SimHost::new(VH).with_region(2000.0, 1000.0).centered_on_region();
        let log = CallbackLog::new();
        let mut c = log
            .attach(ScrollJackOptions::new().enabled(false))
            .build(host)
            .unwrap();
        assert_eq!(c.host().listener_count(), 0);
        c.set_enabled(true);
        assert_eq!(c.host().listener_count(), ListenerKind::ALL.len());
        assert!(c.is_scroll_locked());
    }

    #[test]
    fn reduced_motion_forces_disabled() {
        let host = SimHost::new(VH)
            .with_region(2000.0, 1000.0)
            .centered_on_region()
            .with_reduced_motion();
        let log = CallbackLog::new();
        let mut c = log.attach(ScrollJackOptions::new()).build(host).unwrap();
        assert!(!c.is_enabled());
        assert_eq!(c.host().listener_count(), 0);
        c.set_enabled(true);
        assert!(!c.is_enabled());
        for delta in [100.0, -100.0, 5000.0] {
            assert_eq!(
                c.handle_event(&InputEvent::wheel(delta)),
                Disposition::PassThrough
            );
        }
        c.handle_event(&InputEvent::touch_start(500.0));
        assert_eq!(
            c.handle_event(&InputEvent::touch_move(100.0)),
            Disposition::PassThrough
        );
        assert!(!c.is_scroll_locked());
    }

    #[test]
    fn destroy_releases_everything_and_silences_callbacks() {
        let (mut c, log) = centered();
        c.handle_event(&InputEvent::wheel(100.0));
        let locks = log.locks().len();
        c.destroy();
        assert_eq!(c.host().listener_count(), 0);
        assert_eq!(c.host().pending_frames(), 0);

        c.handle_event(&InputEvent::wheel(100.0));
        c.set_progress(0.7);
        c.unlock();
        crate::sim::advance_frame(&mut c);
        assert!(log.progress().is_empty());
        assert_eq!(log.locks().len(), locks);

        c.destroy();
        assert!(c.is_destroyed());
    }

    #[test]
    fn activation_loop_parks_out_of_range_and_rearms_on_scroll() {
        let (mut c, _log) = centered();
        c.host_mut().scroll_y = 20_000.0;
        crate::sim::advance_frame(&mut c);
        assert!(!c.is_active());
        assert!(!c.snapshot().activation_loop_armed);

        c.host_mut().scroll_y = 2000.0 - VH;
        c.handle_event(&InputEvent::Scroll);
        assert!(c.snapshot().activation_loop_armed);
    }

    #[test]
    fn stale_frames_are_ignored() {
        let (mut c, log) = centered();
        c.run_frame(FrameHandle::new(9_999));
        assert!(log.progress().is_empty());
    }
}
