//! bms-core: shared foundation for the block-diagram simulator.
//!
//! Contains:
//! - ids (compact arena handles for variables and blocks)
//! - numeric (finiteness checks, interpolation)
//! - integrator (fixed-step RK4 / forward Euler over a `TransientModel`)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod integrator;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use integrator::{ForwardEuler, Integrator, IntegratorType, RK4, TransientModel};
pub use numeric::*;
