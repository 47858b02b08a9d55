//! Fixed-step time integrators.

use crate::error::CoreResult;

/// Trait for continuous-time models advanced by an [`Integrator`].
///
/// A model supplies:
/// - the state derivative `x_dot = f(t, x)`
/// - vector-space arithmetic on its state (add, scale)
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Compute state derivative dxdt = f(t, x).
    ///
    /// Takes `&mut self` so models may cache intermediate products.
    fn rhs(&mut self, t: f64, x: &Self::State) -> CoreResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step using the transient model.
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> CoreResult<M::State>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> CoreResult<M::State> {
        let k1 = model.rhs(t, x)?;

        let x2 = model.add(x, &model.scale(&k1, 0.5 * dt));
        let k2 = model.rhs(t + 0.5 * dt, &x2)?;

        let x3 = model.add(x, &model.scale(&k2, 0.5 * dt));
        let k3 = model.rhs(t + 0.5 * dt, &x3)?;

        let x4 = model.add(x, &model.scale(&k3, dt));
        let k4 = model.rhs(t + dt, &x4)?;

        // x_new = x + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = model.add(
            &model.add(&k1, &model.scale(&k2, 2.0)),
            &model.add(&model.scale(&k3, 2.0), &k4),
        );

        Ok(model.add(x, &model.scale(&k_sum, dt / 6.0)))
    }
}

/// Forward Euler (explicit, 1st order).
/// Calls rhs() once per step instead of 4 times (RK4).
#[derive(Clone, Copy, Debug)]
pub struct ForwardEuler;

impl Integrator for ForwardEuler {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> CoreResult<M::State> {
        let xdot = model.rhs(t, x)?;
        Ok(model.add(x, &model.scale(&xdot, dt)))
    }
}

/// Integrator selection for a simulation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

impl IntegratorType {
    /// Short lowercase name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            IntegratorType::RK4 => "rk4",
            IntegratorType::ForwardEuler => "euler",
        }
    }
}

impl Integrator for IntegratorType {
    fn step<M: TransientModel>(
        &self,
        model: &mut M,
        t: f64,
        x: &M::State,
        dt: f64,
    ) -> CoreResult<M::State> {
        match self {
            IntegratorType::RK4 => RK4.step(model, t, x, dt),
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, x, dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x' = -x, x(0) = 1.
    struct Decay;

    impl TransientModel for Decay {
        type State = f64;

        fn rhs(&mut self, _t: f64, x: &f64) -> CoreResult<f64> {
            Ok(-x)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }
    }

    /// x' = t, exercises the time argument.
    struct Clock;

    impl TransientModel for Clock {
        type State = f64;

        fn rhs(&mut self, t: f64, _x: &f64) -> CoreResult<f64> {
            Ok(t)
        }

        fn add(&self, a: &f64, b: &f64) -> f64 {
            a + b
        }

        fn scale(&self, a: &f64, scale: f64) -> f64 {
            a * scale
        }
    }

    fn integrate(integrator: IntegratorType, dt: f64, steps: usize) -> f64 {
        let mut x = 1.0;
        let mut t = 0.0;
        for _ in 0..steps {
            x = integrator.step(&mut Decay, t, &x, dt).unwrap();
            t += dt;
        }
        x
    }

    #[test]
    fn euler_single_step() {
        let x = ForwardEuler.step(&mut Decay, 0.0, &1.0, 0.1).unwrap();
        assert!((x - 0.9).abs() < 1e-15);
    }

    #[test]
    fn rk4_matches_exponential() {
        let x = integrate(IntegratorType::RK4, 0.01, 100);
        assert!((x - (-1.0_f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn rk4_beats_euler() {
        let exact = (-1.0_f64).exp();
        let rk4 = (integrate(IntegratorType::RK4, 0.05, 20) - exact).abs();
        let euler = (integrate(IntegratorType::ForwardEuler, 0.05, 20) - exact).abs();
        assert!(rk4 < euler * 1e-3, "rk4 err {rk4}, euler err {euler}");
    }

    #[test]
    fn rk4_is_exact_for_quadratic() {
        // x(t) = t^2 / 2
        let x = RK4.step(&mut Clock, 1.0, &0.5, 1.0).unwrap();
        assert!((x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn default_is_rk4() {
        assert_eq!(IntegratorType::default(), IntegratorType::RK4);
        assert_eq!(IntegratorType::ForwardEuler.name(), "euler");
    }
}
