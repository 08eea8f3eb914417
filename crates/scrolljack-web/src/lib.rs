#![forbid(unsafe_code)]

//! Browser binding for `scrolljack-core`.
//!
//! [`ScrollJack`](crate::ScrollJack) (wasm32 only) is the `wasm-bindgen`
//! export pages construct. It implements the core `Host` trait over
//! `window` listeners, `requestAnimationFrame`, and the target element's
//! layout, and republishes controller callbacks as `window` CustomEvents.
//!
//! The [`events`] module holds the parts that do not touch the DOM and is
//! compiled everywhere so it can be tested natively.

pub mod events;

#[cfg(target_arch = "wasm32")]
mod dom_host;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::ScrollJack;
