//! Engine error type

use thiserror::Error;

/// Errors raised by the geometry engine.
///
/// Degenerate geometry (zero angles, centers outside the disc) is repaired
/// numerically and never shows up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("layout failed: placed {placed} of {required} toppings, gave up after {attempts} attempts")]
    Layout {
        placed: usize,
        required: usize,
        attempts: usize,
    },

    #[error("no remaining pizza to cut")]
    NoRemainingPizza,

    #[error("pizza id {0} is not in the inventory")]
    UnknownPizza(usize),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration(msg.into())
    }
}
