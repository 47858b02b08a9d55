//! Named trajectory buffers.

use crate::error::{SimError, SimResult};

/// Append-only, time-indexed trajectory of one scalar signal.
///
/// Sample `i` belongs to time `t_i` of the system that wrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    values: Vec<f64>,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full trajectory recorded so far.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Append a sample. Non-finite values are kept so that diverging
    /// dynamics stay visible in the trajectory.
    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    /// Append a sample, rejecting NaN and infinities.
    pub fn try_push(&mut self, value: f64) -> SimResult<()> {
        if !value.is_finite() {
            return Err(SimError::invalid_state(format!(
                "non-finite sample {value} for variable '{}' at index {}",
                self.name,
                self.values.len()
            )));
        }
        self.values.push(value);
        Ok(())
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.values.reserve(additional);
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}
