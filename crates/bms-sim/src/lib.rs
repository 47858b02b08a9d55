//! Fixed-step simulation of block diagrams.
//!
//! Provides:
//! - `Variable`: named, append-only trajectory buffers
//! - `TimeGrid`: uniform time grid `t_i = i * total_time / steps`
//! - `SystemBuilder` / `DynamicSystem`: ordered block evaluation per step
//!
//! Blocks are evaluated in exactly the order supplied. A block reading a
//! variable must come after the block writing it; this is checked when the
//! system is built.

pub mod error;
pub mod system;
pub mod time;
pub mod variable;

pub use error::{SimError, SimResult};
pub use system::{DynamicSystem, RunState, SimOptions, SystemBuilder};
pub use time::TimeGrid;
pub use variable::Variable;
