//! Block primitives for the block-diagram simulator.
//!
//! A diagram is a list of scalar blocks wired through trajectory variables:
//! - **Sources** generate a signal from simulation time (sinus, step, ramp, constant)
//! - **Linear blocks** integrate a transfer function `B(s)/A(s)` in state-space form
//! - **Nonlinear blocks** apply a memoryless map (saturation)
//!
//! Blocks only compute samples. Reading inputs from and appending outputs to
//! variables is the job of the driver in `bms-sim`.

pub mod block;
pub mod continuous;
pub mod error;
pub mod nonlinear;
pub mod signal;

pub use block::{Block, StepContext};
pub use continuous::{ODE, StateSpace};
pub use error::{BlockError, BlockResult};
pub use nonlinear::Saturation;
pub use signal::{Constant, Ramp, Signal, SignalSource, Sinus, Step};
