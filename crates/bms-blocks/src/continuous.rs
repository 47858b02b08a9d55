//! Linear time-invariant blocks given as a transfer function.
//!
//! `H(s) = B(s) / A(s)` with both polynomials in **descending** powers of `s`:
//! - `numerator = [b_0, b_1, ..., b_m]` is `b_0 s^m + ... + b_m`
//! - `denominator = [a_0, a_1, ..., a_n]` is `a_0 s^n + ... + a_n`
//!
//! The block is realized in controllable canonical form and advanced with a
//! fixed-step integrator. Between two samples the input is interpolated
//! linearly (first-order hold).

use bms_core::{CoreResult, Integrator, TransientModel, VariableId, ensure_all_finite, lerp};
use nalgebra::{DMatrix, DVector};

use crate::block::StepContext;
use crate::error::{BlockError, BlockResult};

/// State-space realization `x' = A x + B u`, `y = C x + D u`.
///
/// For a normalized denominator `s^n + a_1 s^{n-1} + ... + a_n` and numerator
/// padded to `b_0 s^n + ... + b_n`:
///
/// ```text
/// A = [-a_1 -a_2 ... -a_n]     B = [1]
///     [  1    0  ...   0 ]         [0]
///     [  0    1  ...   0 ]         [⋮]
///     [  ⋮         ⋱   ⋮ ]         [0]
///
/// C = [b_1 - a_1 b_0, ..., b_n - a_n b_0]     D = b_0
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    a: DMatrix<f64>,
    b: DVector<f64>,
    c: DVector<f64>,
    d: f64,
}

impl StateSpace {
    /// Build the realization, validating the coefficient lists.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the denominator is empty or has a zero
    /// leading coefficient, the numerator is empty or longer than the
    /// denominator (non-proper), or any coefficient is not finite.
    pub fn from_coefficients(numerator: &[f64], denominator: &[f64]) -> BlockResult<Self> {
        if denominator.is_empty() {
            return Err(BlockError::config("denominator must not be empty"));
        }
        if numerator.is_empty() {
            return Err(BlockError::config("numerator must not be empty"));
        }
        ensure_all_finite(denominator, "denominator coefficient")
            .map_err(|e| BlockError::config(e.to_string()))?;
        ensure_all_finite(numerator, "numerator coefficient")
            .map_err(|e| BlockError::config(e.to_string()))?;

        let lead = denominator[0];
        if lead == 0.0 {
            return Err(BlockError::config(
                "leading denominator coefficient must be non-zero",
            ));
        }
        if numerator.len() > denominator.len() {
            return Err(BlockError::config(format!(
                "non-proper transfer function: numerator order {} exceeds denominator order {}",
                numerator.len() - 1,
                denominator.len() - 1
            )));
        }

        let n = denominator.len() - 1;
        let a_norm: Vec<f64> = denominator.iter().map(|&v| v / lead).collect();
        let mut b_norm = vec![0.0; denominator.len() - numerator.len()];
        b_norm.extend(numerator.iter().map(|&v| v / lead));

        let d = b_norm[0];
        let mut a = DMatrix::zeros(n, n);
        for j in 0..n {
            a[(0, j)] = -a_norm[j + 1];
        }
        for i in 1..n {
            a[(i, i - 1)] = 1.0;
        }
        let mut b = DVector::zeros(n);
        if n > 0 {
            b[0] = 1.0;
        }
        let c = DVector::from_fn(n, |j, _| b_norm[j + 1] - a_norm[j + 1] * d);

        Ok(Self { a, b, c, d })
    }

    /// Number of states (denominator order).
    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Direct feedthrough gain `D`.
    pub fn feedthrough(&self) -> f64 {
        self.d
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn c(&self) -> &DVector<f64> {
        &self.c
    }

    /// `A x + B u`
    pub fn derivative(&self, x: &DVector<f64>, u: f64) -> DVector<f64> {
        &self.a * x + &self.b * u
    }

    /// `C x + D u`
    pub fn output(&self, x: &DVector<f64>, u: f64) -> f64 {
        self.c.dot(x) + self.d * u
    }

    /// DC gain `H(0)`, or `None` when `A` is singular (pole at the origin).
    pub fn dc_gain(&self) -> Option<f64> {
        if self.order() == 0 {
            return Some(self.d);
        }
        // y_ss = (D - C A^-1 B) u
        let a_inv = self.a.clone().try_inverse()?;
        Some(self.d - self.c.dot(&(a_inv * &self.b)))
    }
}

/// One integration interval with the input held as a linear ramp.
struct HeldInput<'a> {
    ss: &'a StateSpace,
    t0: f64,
    dt: f64,
    u0: f64,
    u1: f64,
}

impl TransientModel for HeldInput<'_> {
    type State = DVector<f64>;

    fn rhs(&mut self, t: f64, x: &Self::State) -> CoreResult<Self::State> {
        let theta = ((t - self.t0) / self.dt).clamp(0.0, 1.0);
        Ok(self.ss.derivative(x, lerp(self.u0, self.u1, theta)))
    }

    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State {
        a + b
    }

    fn scale(&self, a: &Self::State, scale: f64) -> Self::State {
        a * scale
    }
}

/// Linear ODE block relating an input variable to an output variable.
///
/// # Example
///
/// ```
/// use bms_blocks::{ODE, StepContext};
/// use bms_core::{IntegratorType, VariableId};
///
/// let (u, y) = (VariableId::from_index(0), VariableId::from_index(1));
/// // 1 / (0.1 s + 1)
/// let mut lpf = ODE::new(u, y, &[1.0], &[0.1, 1.0]).unwrap();
///
/// let dt = 0.001;
/// let mut out = lpf.step(&StepContext::new(0.0, dt, IntegratorType::RK4), 1.0).unwrap();
/// for i in 1..=1000 {
///     let ctx = StepContext::new(i as f64 * dt, dt, IntegratorType::RK4);
///     out = lpf.step(&ctx, 1.0).unwrap();
/// }
/// assert!((out - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::upper_case_acronyms)]
pub struct ODE {
    input: VariableId,
    output: VariableId,
    numerator: Vec<f64>,
    denominator: Vec<f64>,
    ss: StateSpace,
    state: DVector<f64>,
    /// Input sample of the previous step; `None` before the first step.
    last_input: Option<f64>,
}

impl ODE {
    /// Create a transfer-function block `numerator(s) / denominator(s)`.
    ///
    /// # Errors
    ///
    /// See [`StateSpace::from_coefficients`].
    pub fn new(
        input: VariableId,
        output: VariableId,
        numerator: &[f64],
        denominator: &[f64],
    ) -> BlockResult<Self> {
        let ss = StateSpace::from_coefficients(numerator, denominator)?;
        let state = DVector::zeros(ss.order());
        Ok(Self {
            input,
            output,
            numerator: numerator.to_vec(),
            denominator: denominator.to_vec(),
            ss,
            state,
            last_input: None,
        })
    }

    pub fn input(&self) -> VariableId {
        self.input
    }

    pub fn output(&self) -> VariableId {
        self.output
    }

    pub fn numerator(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[f64] {
        &self.denominator
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.ss
    }

    /// Current internal state (length fixed at construction).
    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    /// Zero the state and forget the previous input.
    pub fn reset(&mut self) {
        self.state.fill(0.0);
        self.last_input = None;
    }

    /// Produce the output sample for the current step.
    ///
    /// The first call only evaluates `y = C x0 + D u`; every later call first
    /// integrates the state over `[t - dt, t]`.
    pub fn step(&mut self, ctx: &StepContext, u: f64) -> BlockResult<f64> {
        if let Some(u_prev) = self.last_input
            && self.ss.order() > 0
        {
            let t0 = ctx.t - ctx.dt;
            let mut model = HeldInput {
                ss: &self.ss,
                t0,
                dt: ctx.dt,
                u0: u_prev,
                u1: u,
            };
            self.state = ctx.integrator.step(&mut model, t0, &self.state, ctx.dt)?;
        }
        self.last_input = Some(u);
        Ok(self.ss.output(&self.state, u))
    }
}
