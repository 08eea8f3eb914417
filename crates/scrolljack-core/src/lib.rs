#![forbid(unsafe_code)]

//! Scroll-jack core: turns wheel/touch input into bounded progress for one
//! page region and decides when native page scroll must be suppressed.
//!
//! # Role
//! `scrolljack-core` owns the activation / progress / lock state machine. It
//! knows nothing about browsers: geometry, frame scheduling, and global
//! listener registration all flow through the [`host::Host`] trait. The
//! `scrolljack-web` crate binds that trait to the DOM; [`sim::SimHost`]
//! binds it to a deterministic in-memory page for tests and replay.
//!
//! # Primary responsibilities
//! - **Activation**: is the region visible and centered enough to engage?
//! - **Progress**: wheel/touch deltas scaled by sensitivity and region height,
//!   clamped to `[0, 1]`, delivered at most once per frame.
//! - **Lock**: whether the current input must be consumed instead of
//!   scrolling the page.
//!
//! # Usage rule
//! Controllers never coordinate with each other. A page should have at most
//! one engageable region at a time; two overlapping active regions would both
//! claim the same global input.

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod input;
pub mod sim;
pub mod snapshot;

pub use config::ScrollJackConfig;
pub use controller::{Release, ScrollJackController, ScrollJackOptions};
pub use error::{Result, ScrollJackError};
pub use host::{FrameHandle, Host, ListenerKind, ListenerOptions, ListenerToken};
pub use input::{DeltaMode, Disposition, InputEvent, KeyCode, TouchInput, TouchPhase, WheelInput};
pub use snapshot::ScrollJackSnapshot;
