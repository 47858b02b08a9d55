//! Memoryless nonlinear blocks.

use bms_core::VariableId;

use crate::error::{BlockError, BlockResult};

/// Clamp the input to `[low, high]`.
///
/// # Example
///
/// ```
/// use bms_blocks::Saturation;
/// use bms_core::VariableId;
///
/// let sat = Saturation::new(VariableId::from_index(0), VariableId::from_index(1), -2.0, 2.0).unwrap();
/// assert_eq!(sat.apply(5.0), 2.0);
/// assert_eq!(sat.apply(-0.5), -0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Saturation {
    input: VariableId,
    output: VariableId,
    low: f64,
    high: f64,
}

impl Saturation {
    /// # Errors
    ///
    /// Returns a configuration error if either bound is NaN or `low > high`.
    pub fn new(input: VariableId, output: VariableId, low: f64, high: f64) -> BlockResult<Self> {
        if low.is_nan() || high.is_nan() {
            return Err(BlockError::config("saturation bounds must not be NaN"));
        }
        if low > high {
            return Err(BlockError::config(format!(
                "saturation low bound {low} exceeds high bound {high}"
            )));
        }
        Ok(Self {
            input,
            output,
            low,
            high,
        })
    }

    pub fn input(&self) -> VariableId {
        self.input
    }

    pub fn output(&self) -> VariableId {
        self.output
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// NaN passes through unchanged.
    pub fn apply(&self, u: f64) -> f64 {
        u.clamp(self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sat(low: f64, high: f64) -> BlockResult<Saturation> {
        Saturation::new(VariableId::from_index(0), VariableId::from_index(1), low, high)
    }

    #[test]
    fn clamps_at_reference_points() {
        let (low, high) = (-2.0, 3.0);
        let s = sat(low, high).unwrap();
        assert_eq!(s.apply(low - 1.0), low);
        assert_eq!(s.apply(low), low);
        assert_eq!(s.apply((low + high) / 2.0), 0.5);
        assert_eq!(s.apply(high), high);
        assert_eq!(s.apply(high + 1.0), high);
    }

    #[test]
    fn degenerate_interval_is_allowed() {
        let s = sat(1.0, 1.0).unwrap();
        assert_eq!(s.apply(-10.0), 1.0);
        assert_eq!(s.apply(10.0), 1.0);
    }

    #[test]
    fn invalid_bounds() {
        assert!(sat(2.0, -2.0).is_err());
        assert!(sat(f64::NAN, 1.0).is_err());
        assert!(sat(0.0, f64::NAN).is_err());
    }

    #[test]
    fn nan_input_propagates() {
        assert!(sat(-1.0, 1.0).unwrap().apply(f64::NAN).is_nan());
    }

    proptest! {
        #[test]
        fn output_within_bounds(
            low in -1e6f64..1e6,
            width in 0.0f64..1e6,
            x in -1e7f64..1e7,
        ) {
            let s = sat(low, low + width).unwrap();
            let y = s.apply(x);
            prop_assert!(y >= low && y <= low + width);
            if x >= low && x <= low + width {
                prop_assert_eq!(y, x);
            }
        }
    }
}
