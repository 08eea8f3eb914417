#![forbid(unsafe_code)]

//! Deterministic in-memory host.
//!
//! [`SimHost`] models one page with a single monitored region: viewport
//! height, scroll position, and region placement are plain fields the caller
//! mutates between events. Frames only fire when the caller advances them
//! with [`advance_frame`], so every test and replay is reproducible.
//!
//! ```
//! use scrolljack_core::sim::{CallbackLog, SimHost, advance_frame};
//! use scrolljack_core::{InputEvent, ScrollJackOptions};
//!
//! let host = SimHost::new(1200.0).with_region(2000.0, 1000.0).centered_on_region();
//! let log = CallbackLog::new();
//! let mut controller = log.attach(ScrollJackOptions::new()).build(host).unwrap();
//!
//! controller.handle_event(&InputEvent::wheel(100.0));
//! advance_frame(&mut controller);
//! assert_eq!(log.progress().len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::controller::{ScrollJackController, ScrollJackOptions};
use crate::geometry::{OffsetMetrics, RegionRect, Viewport};
use crate::host::{FrameHandle, Host, ListenerKind, ListenerOptions, ListenerToken};
use crate::input::{Disposition, InputEvent};

/// In-memory page with one region.
#[derive(Debug, Clone)]
pub struct SimHost {
    /// `innerHeight`.
    pub viewport_height: f64,
    /// `scrollY`.
    pub scroll_y: f64,
    /// Region top in page coordinates.
    pub region_top: f64,
    /// Rendered region height.
    pub region_height: f64,
    /// Reported `offsetHeight` when it differs from the rendered height.
    pub offset_height: Option<f64>,
    pub reduced_motion: bool,

    next_id: u64,
    frames: Vec<FrameHandle>,
    listeners: Vec<(ListenerToken, ListenerKind, ListenerOptions)>,
    frames_requested: u64,
    frames_cancelled: u64,
}

impl SimHost {
    /// Empty page: region of zero height at the top, no scroll.
    #[must_use]
    pub fn new(viewport_height: f64) -> Self {
        Self {
            viewport_height,
            scroll_y: 0.0,
            region_top: 0.0,
            region_height: 0.0,
            offset_height: None,
            reduced_motion: false,
            next_id: 1,
            frames: Vec::new(),
            listeners: Vec::new(),
            frames_requested: 0,
            frames_cancelled: 0,
        }
    }

    #[must_use]
    pub fn with_region(mut self, top: f64, height: f64) -> Self {
        self.region_top = top;
        self.region_height = height;
        self
    }

    #[must_use]
    pub fn with_offset_height(mut self, height: f64) -> Self {
        self.offset_height = Some(height);
        self
    }

    #[must_use]
    pub fn scrolled_to(mut self, scroll_y: f64) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    #[must_use]
    pub fn with_reduced_motion(mut self) -> Self {
        self.reduced_motion = true;
        self
    }

    #[must_use]
    pub fn centered_on_region(mut self) -> Self {
        self.center_on_region();
        self
    }

    /// Scroll so the region midpoint sits at the viewport midpoint.
    pub fn center_on_region(&mut self) {
        self.scroll_y = self.region_top + self.region_height / 2.0 - self.viewport_height / 2.0;
    }

    /// Frames requested and not yet fired or cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn frames_requested(&self) -> u64 {
        self.frames_requested
    }

    #[must_use]
    pub fn frames_cancelled(&self) -> u64 {
        self.frames_cancelled
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.listeners.iter().any(|(_, k, _)| *k == kind)
    }

    #[must_use]
    pub fn listener_options(&self, kind: ListenerKind) -> Option<ListenerOptions> {
        self.listeners
            .iter()
            .find(|(_, k, _)| *k == kind)
            .map(|(_, _, options)| *options)
    }

    /// Drain every frame due now. Frames requested while running them land
    /// in the next batch.
    pub fn take_due_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.frames)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Host for SimHost {
    fn bounding_rect(&self) -> RegionRect {
        RegionRect::new(self.region_top - self.scroll_y, self.region_height)
    }

    fn offset_metrics(&self) -> OffsetMetrics {
        OffsetMetrics::new(
            self.region_top,
            self.offset_height.unwrap_or(self.region_height),
        )
    }

    fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_height, self.scroll_y)
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id());
        self.frames.push(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.frames.len();
        self.frames.retain(|h| *h != handle);
        if self.frames.len() != before {
            self.frames_cancelled += 1;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerToken {
        let token = ListenerToken::new(self.next_id());
        self.listeners.push((token, kind, options));
        token
    }

    fn remove_listener(&mut self, token: ListenerToken) {
        self.listeners.retain(|(t, _, _)| *t != token);
    }
}

/// Deliver `event` the way a page would: only through a registered listener.
/// Events with no listener for their kind pass through unseen.
pub fn dispatch(controller: &mut ScrollJackController<SimHost>, event: &InputEvent) -> Disposition {
    if controller.host().has_listener(event.listener_kind()) {
        controller.handle_event(event)
    } else {
        Disposition::PassThrough
    }
}

/// Fire one batch of frames. Returns how many fired.
pub fn advance_frame(controller: &mut ScrollJackController<SimHost>) -> usize {
    let due = controller.host_mut().take_due_frames();
    for handle in &due {
        controller.run_frame(*handle);
    }
    due.len()
}

/// Records every callback a controller makes.
#[derive(Debug, Clone, Default)]
pub struct CallbackLog {
    progress: Rc<RefCell<Vec<f64>>>,
    locks: Rc<RefCell<Vec<bool>>>,
}

impl CallbackLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install recording callbacks on `options`.
    #[must_use]
    pub fn attach(&self, options: ScrollJackOptions) -> ScrollJackOptions {
        let progress = Rc::clone(&self.progress);
        let locks = Rc::clone(&self.locks);
        options
            .on_progress(move |p| progress.borrow_mut().push(p))
            .on_lock_change(move |l| locks.borrow_mut().push(l))
    }

    /// Values delivered to `on_progress`, oldest first.
    #[must_use]
    pub fn progress(&self) -> Vec<f64> {
        self.progress.borrow().clone()
    }

    /// Values delivered to `on_lock_change`, oldest first.
    #[must_use]
    pub fn locks(&self) -> Vec<bool> {
        self.locks.borrow().clone()
    }

    /// Total callbacks recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.progress.borrow().len() + self.locks.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
