//! Error types for building and running systems.

use bms_blocks::BlockError;
use bms_core::CoreError;
use thiserror::Error;

/// Errors encountered while configuring or running a system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Invalid parameters or wiring; the simulation never starts.
    #[error("Configuration error: {what}")]
    Configuration { what: String },

    /// Operation invoked in the wrong state.
    #[error("Invalid state: {what}")]
    InvalidState { what: String },

    /// Failure raised by a block while stepping.
    #[error("Block error: {message}")]
    Block { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SimError::Configuration { what: what.into() }
    }

    pub(crate) fn invalid_state(what: impl Into<String>) -> Self {
        SimError::InvalidState { what: what.into() }
    }
}

impl From<BlockError> for SimError {
    fn from(e: BlockError) -> Self {
        match e {
            BlockError::Configuration { what } => SimError::Configuration { what },
            other => SimError::Block {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::Configuration {
            what: e.to_string(),
        }
    }
}
