#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use scrolljack_core::{ScrollJackError, ScrollJackOptions};

use crate::dom_host::{Bridge, DomController, DomHost};
use crate::events::{self, Notification};

/// `console.error(message)` when the global has a console; silent otherwise.
fn report(message: &str) {
    let Ok(console) = Reflect::get(&js_sys::global(), &JsValue::from_str("console")) else {
        return;
    };
    let error = Reflect::get(&console, &JsValue::from_str("error"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok());
    if let Some(error) = error {
        let _ = error.call1(&console, &JsValue::from_str(message));
    }
}

/// Route Rust panics to the browser console, tagged with the crate name.
fn route_panics_to_console() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| report(&format!("scrolljack: {info}"))));
    });
}

fn to_js_error(err: ScrollJackError) -> JsError {
    JsError::new(&err.to_string())
}

/// `JSON.stringify` the options object; `None` for `undefined` / `null`.
fn options_json(options: &JsValue) -> Result<Option<String>, JsError> {
    if options.is_undefined() || options.is_null() {
        return Ok(None);
    }
    js_sys::JSON::stringify(options)
        .map(|s| s.as_string())
        .map_err(|_| JsError::new("scroll-jack options must be JSON-serializable"))
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    route_panics_to_console();
}

/// Scroll-jack controller bound to one element.
///
/// ```js
/// const jack = new ScrollJack(section, (p) => render(p), (locked) => {}, { sensitivity: 0.5 });
/// // later
/// jack.destroy();
/// ```
///
/// Every progress delivery and lock change is also dispatched on `window` as
/// `scrolljack-progress` / `scrolljack-lock` with `detail.target` set to the
/// element.
#[wasm_bindgen]
pub struct ScrollJack {
    controller: Rc<RefCell<DomController>>,
    bridge: Rc<Bridge>,
}

#[wasm_bindgen]
impl ScrollJack {
    /// Attach to `target`. Throws when `on_progress` is not a function or the
    /// options are invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(
        target: HtmlElement,
        on_progress: JsValue,
        on_lock_change: JsValue,
        options: JsValue,
    ) -> Result<ScrollJack, JsError> {
        route_panics_to_console();
        let window = web_sys::window().ok_or_else(|| JsError::new("scroll-jack requires a window"))?;
        let on_progress = on_progress
            .dyn_into::<Function>()
            .map_err(|_| to_js_error(ScrollJackError::MissingProgressCallback))?;
        let on_lock_change = on_lock_change.dyn_into::<Function>().ok();
        let config = events::parse_options(options_json(&options)?.as_deref()).map_err(to_js_error)?;

        let bridge = Rc::new(Bridge::new(
            window.clone(),
            target.clone(),
            on_progress,
            on_lock_change,
        ));
        let host = DomHost::new(window, target, Rc::clone(&bridge));
        let progress_bridge = Rc::clone(&bridge);
        let lock_bridge = Rc::clone(&bridge);
        let controller = ScrollJackOptions::new()
            .config(config)
            .on_progress(move |p| progress_bridge.post(Notification::Progress(p)))
            .on_lock_change(move |locked| lock_bridge.post(Notification::Lock(locked)))
            .build(host)
            .map_err(to_js_error)?;

        let controller = Rc::new(RefCell::new(controller));
        bridge.attach(&controller);
        // Lock state established during construction.
        bridge.flush();
        Ok(Self { controller, bridge })
    }

    #[wasm_bindgen(js_name = setProgress)]
    pub fn set_progress(&self, value: f64) {
        self.bridge
            .with_controller("setProgress", |c| c.set_progress(value));
    }

    #[wasm_bindgen(js_name = getProgress)]
    pub fn get_progress(&self) -> f64 {
        self.controller
            .try_borrow()
            .map(|c| c.progress())
            .unwrap_or(0.0)
    }

    #[wasm_bindgen(js_name = isScrollLocked)]
    pub fn is_scroll_locked(&self) -> bool {
        self.controller
            .try_borrow()
            .is_ok_and(|c| c.is_scroll_locked())
    }

    pub fn unlock(&self) {
        self.bridge.with_controller("unlock", |c| c.unlock());
    }

    #[wasm_bindgen(js_name = setEnabled)]
    pub fn set_enabled(&self, enabled: bool) {
        self.bridge
            .with_controller("setEnabled", |c| c.set_enabled(enabled));
    }

    /// Remove every listener and pending frame. Safe to call repeatedly.
    pub fn destroy(&self) {
        self.bridge.with_controller("destroy", |c| c.destroy());
    }

    /// Controller state as JSON, for debugging overlays and logs.
    #[wasm_bindgen(js_name = snapshotJson)]
    pub fn snapshot_json(&self) -> String {
        self.controller
            .try_borrow()
            .map(|c| c.snapshot().to_json())
            .unwrap_or_else(|_| "{}".to_string())
    }
}
