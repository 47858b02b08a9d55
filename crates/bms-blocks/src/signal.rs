//! Time-driven signal sources.
//!
//! A signal is a pure function of simulation time. It owns no input and no
//! state, so sampling the same instant twice gives the same value.

use bms_core::VariableId;
use serde::{Deserialize, Serialize};

use crate::error::{BlockError, BlockResult, finite_param};

/// Sinusoid: `amplitude * sin(w * t + phase) + offset`.
///
/// # Example
///
/// ```
/// use bms_blocks::Sinus;
///
/// let sine = Sinus::new(2.0, std::f64::consts::PI, 0.0, 1.0).unwrap();
/// assert_eq!(sine.sample(0.0), 1.0);
/// assert!((sine.sample(0.5) - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sinus {
    /// Peak amplitude.
    pub amplitude: f64,
    /// Angular frequency (rad/s).
    pub w: f64,
    /// Phase at t = 0 (rad).
    #[serde(default)]
    pub phase: f64,
    /// Constant added to the wave.
    #[serde(default)]
    pub offset: f64,
}

impl Sinus {
    /// Create a sinusoid; every parameter must be finite.
    pub fn new(amplitude: f64, w: f64, phase: f64, offset: f64) -> BlockResult<Self> {
        let sine = Self {
            amplitude,
            w,
            phase,
            offset,
        };
        sine.validate()?;
        Ok(sine)
    }

    fn validate(&self) -> BlockResult<()> {
        finite_param(self.amplitude, "sinus amplitude")?;
        finite_param(self.w, "sinus angular frequency")?;
        finite_param(self.phase, "sinus phase")?;
        finite_param(self.offset, "sinus offset")?;
        Ok(())
    }

    pub fn sample(&self, t: f64) -> f64 {
        self.amplitude * (self.w * t + self.phase).sin() + self.offset
    }

    /// Period `2π / w`, or `None` for a zero frequency.
    pub fn period(&self) -> Option<f64> {
        if self.w == 0.0 {
            None
        } else {
            Some(std::f64::consts::TAU / self.w.abs())
        }
    }
}

/// Constant level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub value: f64,
}

impl Constant {
    pub fn new(value: f64) -> BlockResult<Self> {
        finite_param(value, "constant value")?;
        Ok(Self { value })
    }

    pub fn sample(&self, _t: f64) -> f64 {
        self.value
    }
}

/// Step of height `amplitude` at `t = delay`, sitting on `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub amplitude: f64,
    /// Switching time (s).
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Step {
    pub fn new(amplitude: f64, delay: f64, offset: f64) -> BlockResult<Self> {
        let step = Self {
            amplitude,
            delay,
            offset,
        };
        step.validate()?;
        Ok(step)
    }

    fn validate(&self) -> BlockResult<()> {
        finite_param(self.amplitude, "step amplitude")?;
        finite_param(self.delay, "step delay")?;
        finite_param(self.offset, "step offset")?;
        Ok(())
    }

    pub fn sample(&self, t: f64) -> f64 {
        if t >= self.delay {
            self.offset + self.amplitude
        } else {
            self.offset
        }
    }
}

/// Ramp of `slope` starting at `t = delay`, sitting on `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub slope: f64,
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub offset: f64,
}

impl Ramp {
    pub fn new(slope: f64, delay: f64, offset: f64) -> BlockResult<Self> {
        let ramp = Self {
            slope,
            delay,
            offset,
        };
        ramp.validate()?;
        Ok(ramp)
    }

    fn validate(&self) -> BlockResult<()> {
        finite_param(self.slope, "ramp slope")?;
        finite_param(self.delay, "ramp delay")?;
        finite_param(self.offset, "ramp offset")?;
        Ok(())
    }

    pub fn sample(&self, t: f64) -> f64 {
        if t >= self.delay {
            self.offset + self.slope * (t - self.delay)
        } else {
            self.offset
        }
    }
}

/// Any supported signal shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Signal {
    Sinus(Sinus),
    Constant(Constant),
    Step(Step),
    Ramp(Ramp),
}

impl Signal {
    /// Evaluate the signal at time `t`.
    pub fn sample(&self, t: f64) -> f64 {
        match self {
            Signal::Sinus(s) => s.sample(t),
            Signal::Constant(c) => c.sample(t),
            Signal::Step(s) => s.sample(t),
            Signal::Ramp(r) => r.sample(t),
        }
    }

    /// Re-check parameters, e.g. after deserialization bypassed the constructors.
    pub fn validate(&self) -> BlockResult<()> {
        match self {
            Signal::Sinus(s) => s.validate(),
            Signal::Constant(c) => finite_param(c.value, "constant value").map(|_| ()),
            Signal::Step(s) => s.validate(),
            Signal::Ramp(r) => r.validate(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Signal::Sinus(_) => "Sinus",
            Signal::Constant(_) => "Constant",
            Signal::Step(_) => "Step",
            Signal::Ramp(_) => "Ramp",
        }
    }
}

impl From<Sinus> for Signal {
    fn from(s: Sinus) -> Self {
        Signal::Sinus(s)
    }
}

impl From<Constant> for Signal {
    fn from(c: Constant) -> Self {
        Signal::Constant(c)
    }
}

impl From<Step> for Signal {
    fn from(s: Step) -> Self {
        Signal::Step(s)
    }
}

impl From<Ramp> for Signal {
    fn from(r: Ramp) -> Self {
        Signal::Ramp(r)
    }
}

/// Source block: writes `signal(t)` into its output variable each step.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSource {
    output: VariableId,
    signal: Signal,
}

impl SignalSource {
    pub fn new(output: VariableId, signal: impl Into<Signal>) -> BlockResult<Self> {
        let signal = signal.into();
        signal.validate().map_err(|e| match e {
            BlockError::Configuration { what } => {
                BlockError::config(format!("{} source: {what}", signal.kind_name()))
            }
            other => other,
        })?;
        Ok(Self { output, signal })
    }

    pub fn output(&self) -> VariableId {
        self.output
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn sample(&self, t: f64) -> f64 {
        self.signal.sample(t)
    }
}
