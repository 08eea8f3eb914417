#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrollJackError>;

/// Construction-time failures.
///
/// Nothing on the input hot path returns an error: malformed geometry and
/// non-finite deltas are absorbed there. Only misconfiguration is reported.
#[derive(Debug, Error)]
pub enum ScrollJackError {
    #[error("scroll-jack controller requires an on_progress callback")]
    MissingProgressCallback,

    #[error("sensitivity must be finite and positive (got {value})")]
    InvalidSensitivity { value: f64 },

    #[error("activation threshold must lie in [0, 1] (got {value})")]
    InvalidActivationThreshold { value: f64 },

    #[error("invalid scroll-jack options: {0}")]
    Config(#[from] serde_json::Error),
}
