#![forbid(unsafe_code)]

//! Controller tuning and its JSON representation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrollJackError};

/// Multiplier applied to raw pixel deltas.
pub const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Minimum overlap ratio for activation.
pub const DEFAULT_ACTIVATION_THRESHOLD: f64 = 0.1;

/// Progress changes smaller than this are dropped.
pub const PROGRESS_EPSILON: f64 = 1e-3;

/// Share of the region height that maps to the full progress range when
/// seeding progress from the scroll position on activation.
pub const INITIAL_PROGRESS_SPAN: f64 = 0.8;

/// Tuning knobs for a [`ScrollJackController`](crate::ScrollJackController).
///
/// Deserializes from the camelCase options object a page passes in
/// (`{"sensitivity": 0.5, "activationThreshold": 0.2}`); missing keys take
/// their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollJackConfig {
    /// Multiplier applied to raw input deltas before scaling by region height.
    pub sensitivity: f64,

    /// Minimum visible-overlap ratio (0–1) required to activate.
    pub activation_threshold: f64,

    /// Requested enabled state. A reduced-motion preference overrides it.
    pub enabled: bool,
}

impl Default for ScrollJackConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            activation_threshold: DEFAULT_ACTIVATION_THRESHOLD,
            enabled: true,
        }
    }
}

impl ScrollJackConfig {
    /// Parse and validate a JSON options object.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make progress meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(ScrollJackError::InvalidSensitivity {
                value: self.sensitivity,
            });
        }
        if !(0.0..=1.0).contains(&self.activation_threshold) {
            return Err(ScrollJackError::InvalidActivationThreshold {
                value: self.activation_threshold,
            });
        }
        Ok(())
    }
}
