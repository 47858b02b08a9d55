use crate::CoreError;

pub fn ensure_finite(v: f64, what: &'static str) -> Result<f64, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Check a coefficient list, reporting the first non-finite entry.
pub fn ensure_all_finite(values: &[f64], what: &'static str) -> Result<(), CoreError> {
    values
        .iter()
        .try_for_each(|&v| ensure_finite(v, what).map(|_| ()))
}

/// Linear interpolation: `a` at `theta = 0`, `b` at `theta = 1`.
#[inline]
pub fn lerp(a: f64, b: f64, theta: f64) -> f64 {
    a + (b - a) * theta
}
