//! Diagram schema definitions.

use bms_blocks::Signal;
use bms_core::IntegratorType;
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

/// A complete simulation: time grid, sources and the ordered block list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagram {
    pub version: u32,
    pub name: String,
    /// Horizon in seconds.
    pub total_time: f64,
    pub steps: usize,
    #[serde(default)]
    pub integrator: IntegratorType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reject_non_finite: bool,
    /// Evaluated first, in order, at every step.
    #[serde(default)]
    pub signals: Vec<SignalDef>,
    /// Evaluated after the signals, in order.
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalDef {
    pub name: String,
    pub kind: Signal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
pub enum BlockDef {
    /// Transfer function, coefficients in descending powers of `s`.
    ODE {
        input: String,
        output: String,
        numerator: Vec<f64>,
        denominator: Vec<f64>,
    },
    Saturation {
        input: String,
        output: String,
        low: f64,
        high: f64,
    },
}

impl BlockDef {
    pub fn input(&self) -> &str {
        match self {
            BlockDef::ODE { input, .. } | BlockDef::Saturation { input, .. } => input,
        }
    }

    pub fn output(&self) -> &str {
        match self {
            BlockDef::ODE { output, .. } | BlockDef::Saturation { output, .. } => output,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BlockDef::ODE { .. } => "ODE",
            BlockDef::Saturation { .. } => "Saturation",
        }
    }
}
