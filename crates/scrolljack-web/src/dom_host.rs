#![forbid(unsafe_code)]

//! [`Host`] over the browser DOM, plus the bridge that routes DOM callbacks
//! back into the controller.
//!
//! # Invariants
//!
//! 1. The controller is never borrowed while JavaScript runs. Controller
//!    callbacks post to the [`Outbox`]; the bridge flushes it after the
//!    borrow is released.
//! 2. Listener and frame closures hold the [`Bridge`], never the controller.
//!    The bridge only holds a weak controller reference, so dropping the
//!    exported handle tears everything down.
//!
//! # Failure Modes
//!
//! A re-entrant call that finds the controller borrowed is dropped with a
//! warning. DOM API failures (listener registration, `requestAnimationFrame`)
//! are logged and otherwise ignored.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use js_sys::{Function, Reflect};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CustomEvent, CustomEventInit, Event, HtmlElement, KeyboardEvent,
    TouchEvent, WheelEvent, Window,
};

use scrolljack_core::geometry::{OffsetMetrics, RegionRect, Viewport};
use scrolljack_core::{
    FrameHandle, Host, InputEvent, ListenerKind, ListenerOptions, ListenerToken,
    ScrollJackController, TouchInput,
};

use crate::events::{self, DETAIL_TARGET, Notification, Outbox};

pub(crate) type DomController = ScrollJackController<DomHost>;

const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// Shared between the exported handle, the host, and every DOM closure.
pub(crate) struct Bridge {
    window: Window,
    target: HtmlElement,
    controller: RefCell<Weak<RefCell<DomController>>>,
    outbox: RefCell<Outbox>,
    on_progress: Function,
    on_lock_change: Option<Function>,
}

impl Bridge {
    pub(crate) fn new(
        window: Window,
        target: HtmlElement,
        on_progress: Function,
        on_lock_change: Option<Function>,
    ) -> Self {
        Self {
            window,
            target,
            controller: RefCell::new(Weak::new()),
            outbox: RefCell::new(Outbox::default()),
            on_progress,
            on_lock_change,
        }
    }

    pub(crate) fn attach(&self, controller: &Rc<RefCell<DomController>>) {
        *self.controller.borrow_mut() = Rc::downgrade(controller);
    }

    /// Queue a controller callback for delivery.
    pub(crate) fn post(&self, notification: Notification) {
        self.outbox.borrow_mut().post(notification);
    }

    /// Run `f` against the controller, then deliver queued notifications.
    pub(crate) fn with_controller<R>(
        &self,
        what: &'static str,
        f: impl FnOnce(&mut DomController) -> R,
    ) -> Option<R> {
        let controller = self.controller.borrow().upgrade()?;
        let out = match controller.try_borrow_mut() {
            Ok(mut c) => Some(f(&mut c)),
            Err(_) => {
                warn!(call = what, "scroll-jack controller busy; dropping re-entrant call");
                None
            }
        };
        self.flush();
        out
    }

    /// Deliver everything queued, including notifications posted by user
    /// code while this flush runs.
    pub(crate) fn flush(&self) {
        loop {
            let pending = self.outbox.borrow_mut().drain();
            if pending.is_empty() {
                break;
            }
            for notification in pending {
                self.deliver(notification);
            }
        }
    }

    fn deliver(&self, notification: Notification) {
        let (callback, value) = match notification {
            Notification::Progress(p) => (Some(&self.on_progress), JsValue::from_f64(p)),
            Notification::Lock(locked) => (self.on_lock_change.as_ref(), JsValue::from_bool(locked)),
        };
        if let Some(callback) = callback
            && let Err(err) = callback.call1(&JsValue::NULL, &value)
        {
            warn!(event = notification.event_type(), ?err, "scroll-jack callback threw");
        }
        self.dispatch_window_event(notification);
    }

    fn dispatch_window_event(&self, notification: Notification) {
        let Ok(detail) = js_sys::JSON::parse(&notification.detail_json()) else {
            return;
        };
        let _ = Reflect::set(
            &detail,
            &JsValue::from_str(DETAIL_TARGET),
            &JsValue::from(self.target.clone()),
        );
        let init = CustomEventInit::new();
        init.set_detail(&detail);
        match CustomEvent::new_with_event_init_dict(notification.event_type(), &init) {
            Ok(event) => {
                let _ = self.window.dispatch_event(&event);
            }
            Err(err) => warn!(event = notification.event_type(), ?err, "failed to create event"),
        }
    }

    fn on_dom_event(&self, kind: ListenerKind, event: &Event) {
        let Some(input) = translate(kind, event) else {
            return;
        };
        let disposition = self.with_controller(kind.dom_name(), |c| c.handle_event(&input));
        if disposition.is_some_and(|d| d.is_consumed()) {
            event.prevent_default();
            event.stop_propagation();
        }
    }

    fn on_frame(&self, handle: FrameHandle) {
        self.with_controller("frame", |c| {
            c.host_mut().forget_frame(handle);
            c.run_frame(handle);
        });
    }
}

/// DOM event to controller input. `None` for events of an unexpected shape.
fn translate(kind: ListenerKind, event: &Event) -> Option<InputEvent> {
    match kind {
        ListenerKind::Wheel => {
            let wheel = event.dyn_ref::<WheelEvent>()?;
            Some(InputEvent::Wheel(events::wheel_input(
                wheel.delta_y(),
                wheel.delta_mode(),
            )))
        }
        ListenerKind::TouchStart | ListenerKind::TouchMove => {
            let touch = event.dyn_ref::<TouchEvent>()?.touches().get(0)?;
            Some(InputEvent::Touch(TouchInput {
                phase: events::touch_phase(kind)?,
                y: f64::from(touch.client_y()),
            }))
        }
        ListenerKind::TouchEnd => Some(InputEvent::touch_end()),
        ListenerKind::TouchCancel => Some(InputEvent::touch_cancel()),
        ListenerKind::KeyDown => event
            .dyn_ref::<KeyboardEvent>()
            .map(|key| InputEvent::key(&key.key())),
        ListenerKind::Scroll => Some(InputEvent::Scroll),
        ListenerKind::Resize => Some(InputEvent::Resize),
    }
}

// ---------------------------------------------------------------------------
// DomHost
// ---------------------------------------------------------------------------

struct Registration {
    kind: ListenerKind,
    closure: Closure<dyn FnMut(Event)>,
}

/// Listeners go on `window`; geometry comes from the target element.
pub(crate) struct DomHost {
    window: Window,
    target: HtmlElement,
    bridge: Rc<Bridge>,
    listeners: HashMap<u64, Registration>,
    // Our frame id to the browser's rAF id.
    frames: HashMap<u64, i32>,
    next_id: u64,
}

impl DomHost {
    pub(crate) fn new(window: Window, target: HtmlElement, bridge: Rc<Bridge>) -> Self {
        Self {
            window,
            target,
            bridge,
            listeners: HashMap::new(),
            frames: HashMap::new(),
            next_id: 1,
        }
    }

    fn forget_frame(&mut self, handle: FrameHandle) {
        self.frames.remove(&handle.id());
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Host for DomHost {
    fn bounding_rect(&self) -> RegionRect {
        let rect = self.target.get_bounding_client_rect();
        RegionRect::new(rect.top(), rect.height())
    }

    fn offset_metrics(&self) -> OffsetMetrics {
        OffsetMetrics::new(
            f64::from(self.target.offset_top()),
            f64::from(self.target.offset_height()),
        )
    }

    fn viewport(&self) -> Viewport {
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        Viewport::new(height, self.window.scroll_y().unwrap_or(0.0))
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.window
            .match_media(REDUCED_MOTION_QUERY)
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle::new(self.next_id());
        let bridge = Rc::clone(&self.bridge);
        // Freed by wasm-bindgen once it runs. A cancelled frame leaks its
        // closure.
        let callback = Closure::once_into_js(move |_timestamp: f64| bridge.on_frame(handle));
        match self.window.request_animation_frame(callback.unchecked_ref()) {
            Ok(raf) => {
                self.frames.insert(handle.id(), raf);
            }
            Err(err) => warn!(?err, "requestAnimationFrame failed"),
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(raf) = self.frames.remove(&handle.id()) {
            let _ = self.window.cancel_animation_frame(raf);
        }
    }

    fn add_listener(&mut self, kind: ListenerKind, options: ListenerOptions) -> ListenerToken {
        let token = ListenerToken::new(self.next_id());
        let bridge = Rc::clone(&self.bridge);
        let closure = Closure::wrap(
            Box::new(move |event: Event| bridge.on_dom_event(kind, &event)) as Box<dyn FnMut(Event)>,
        );

        let dom_options = AddEventListenerOptions::new();
        dom_options.set_passive(options.passive);
        if let Err(err) = self
            .window
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.dom_name(),
                closure.as_ref().unchecked_ref(),
                &dom_options,
            )
        {
            warn!(event = kind.dom_name(), ?err, "failed to add listener");
        }
        trace!(event = kind.dom_name(), passive = options.passive, "listener added");
        self.listeners
            .insert(token.id(), Registration { kind, closure });
        token
    }

    fn remove_listener(&mut self, token: ListenerToken) {
        let Some(registration) = self.listeners.remove(&token.id()) else {
            return;
        };
        let _ = self.window.remove_event_listener_with_callback(
            registration.kind.dom_name(),
            registration.closure.as_ref().unchecked_ref(),
        );
    }
}
