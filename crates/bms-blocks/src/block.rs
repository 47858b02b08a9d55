//! The closed set of blocks a system can evaluate.
//!
//! - **Sources** read time only
//! - **ODE** blocks read one input and carry integrator state
//! - **Saturation** blocks read one input and carry no state

use bms_core::{IntegratorType, VariableId};

use crate::continuous::ODE;
use crate::error::{BlockError, BlockResult};
use crate::nonlinear::Saturation;
use crate::signal::SignalSource;

/// Per-step information handed to every block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Current time `t_i`.
    pub t: f64,
    /// Fixed step size.
    pub dt: f64,
    /// Integrator used by dynamic blocks.
    pub integrator: IntegratorType,
}

impl StepContext {
    pub fn new(t: f64, dt: f64, integrator: IntegratorType) -> Self {
        Self { t, dt, integrator }
    }
}

/// A block in the evaluation list.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Block {
    Source(SignalSource),
    ODE(ODE),
    Saturation(Saturation),
}

impl Block {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Block::Source(_) => "Source",
            Block::ODE(_) => "ODE",
            Block::Saturation(_) => "Saturation",
        }
    }

    /// Variable read by this block, if any.
    pub fn input(&self) -> Option<VariableId> {
        match self {
            Block::Source(_) => None,
            Block::ODE(ode) => Some(ode.input()),
            Block::Saturation(sat) => Some(sat.input()),
        }
    }

    /// Variable written by this block.
    pub fn output(&self) -> VariableId {
        match self {
            Block::Source(src) => src.output(),
            Block::ODE(ode) => ode.output(),
            Block::Saturation(sat) => sat.output(),
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(self, Block::Source(_))
    }

    /// Whether the block carries integrator state between steps.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Block::ODE(ode) if ode.state_space().order() > 0)
    }

    /// Return the block to its pre-simulation state.
    pub fn reset(&mut self) {
        if let Block::ODE(ode) = self {
            ode.reset();
        }
    }

    /// Compute this step's output sample.
    ///
    /// `input` is the current sample of [`Block::input`]; it must be present
    /// for every block that has an input.
    pub fn produce(&mut self, ctx: &StepContext, input: Option<f64>) -> BlockResult<f64> {
        match self {
            Block::Source(src) => Ok(src.sample(ctx.t)),
            Block::ODE(ode) => {
                let u = input.ok_or(BlockError::MissingInput { block: "ODE" })?;
                ode.step(ctx, u)
            }
            Block::Saturation(sat) => {
                let u = input.ok_or(BlockError::MissingInput {
                    block: "Saturation",
                })?;
                Ok(sat.apply(u))
            }
        }
    }
}

impl From<SignalSource> for Block {
    fn from(src: SignalSource) -> Self {
        Block::Source(src)
    }
}

impl From<ODE> for Block {
    fn from(ode: ODE) -> Self {
        Block::ODE(ode)
    }
}

impl From<Saturation> for Block {
    fn from(sat: Saturation) -> Self {
        Block::Saturation(sat)
    }
}
