//! Error types for block construction and evaluation.

use bms_core::CoreError;
use thiserror::Error;

/// Result type for block operations.
pub type BlockResult<T> = Result<T, BlockError>;

/// Errors that can occur while building or stepping a block.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlockError {
    /// Invalid block parameters; the block cannot be built.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// A block with an input was stepped without an input sample.
    #[error("Block '{block}' was evaluated without an input sample")]
    MissingInput { block: &'static str },

    /// Failure inside the numeric layer.
    #[error(transparent)]
    Numeric(#[from] CoreError),
}

impl BlockError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        Self::Configuration { what: what.into() }
    }
}

/// Reject a NaN/infinite parameter as a configuration error.
pub(crate) fn finite_param(value: f64, what: &'static str) -> BlockResult<f64> {
    bms_core::ensure_finite(value, what)
        .map_err(|_| BlockError::config(format!("{what} must be finite (got {value})")))
}
