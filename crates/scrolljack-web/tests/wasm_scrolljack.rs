#![cfg(target_arch = "wasm32")]
#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use scrolljack_web::ScrollJack;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn region() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let el: HtmlElement = document.create_element("section").unwrap().dyn_into().unwrap();
    el.set_attribute("style", "display: block; height: 600px").unwrap();
    document.body().unwrap().append_child(&el).unwrap();
    el
}

fn recorder() -> (JsValue, Rc<RefCell<Vec<f64>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let callback = Closure::wrap(Box::new(move |p: f64| sink.borrow_mut().push(p)) as Box<dyn FnMut(f64)>);
    (callback.into_js_value(), seen)
}

#[wasm_bindgen_test]
fn constructor_requires_progress_callback() {
    let result = ScrollJack::new(region(), JsValue::NULL, JsValue::UNDEFINED, JsValue::UNDEFINED);
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn constructor_rejects_bad_options() {
    let (on_progress, _) = recorder();
    let options = js_sys::JSON::parse(r#"{"sensitivity": 0}"#).unwrap();
    let result = ScrollJack::new(region(), on_progress, JsValue::UNDEFINED, options);
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn set_progress_clamps_and_reads_back() {
    let (on_progress, _) = recorder();
    let jack = ScrollJack::new(region(), on_progress, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .ok()
        .unwrap();
    jack.set_progress(0.4);
    assert_eq!(jack.get_progress(), 0.4);
    jack.set_progress(7.0);
    assert_eq!(jack.get_progress(), 1.0);
    assert!(!jack.is_scroll_locked());
    jack.destroy();
    jack.destroy();
}

#[wasm_bindgen_test]
fn snapshot_reports_listeners_until_destroyed() {
    let (on_progress, _) = recorder();
    let jack = ScrollJack::new(region(), on_progress, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .ok()
        .unwrap();
    let before: serde_json::Value = serde_json::from_str(&jack.snapshot_json()).unwrap();
    assert_eq!(before["destroyed"], false);
    assert_eq!(before["listeners"], 8);

    jack.destroy();
    let after: serde_json::Value = serde_json::from_str(&jack.snapshot_json()).unwrap();
    assert_eq!(after["destroyed"], true);
    assert_eq!(after["listeners"], 0);
}

#[wasm_bindgen_test]
fn disabled_by_options_installs_nothing() {
    let (on_progress, _) = recorder();
    let options = js_sys::JSON::parse(r#"{"enabled": false}"#).unwrap();
    let jack = ScrollJack::new(region(), on_progress, JsValue::UNDEFINED, options)
        .ok()
        .unwrap();
    let snap: serde_json::Value = serde_json::from_str(&jack.snapshot_json()).unwrap();
    assert_eq!(snap["enabled"], false);
    assert_eq!(snap["listeners"], 0);
}
