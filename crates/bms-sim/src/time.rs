//! Uniform simulation time grid.

use crate::error::{SimError, SimResult};

/// `steps + 1` uniformly spaced instants covering `[0, total_time]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    total_time: f64,
    steps: usize,
}

impl TimeGrid {
    /// # Errors
    ///
    /// Returns a configuration error unless `total_time` is finite and
    /// positive and `steps` is positive.
    pub fn new(total_time: f64, steps: usize) -> SimResult<Self> {
        if !total_time.is_finite() || total_time <= 0.0 {
            return Err(SimError::config(format!(
                "total_time must be finite and positive (got {total_time})"
            )));
        }
        if steps == 0 {
            return Err(SimError::config("steps must be positive"));
        }
        Ok(Self { total_time, steps })
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of samples, `steps + 1`.
    pub fn len(&self) -> usize {
        self.steps + 1
    }

    /// Always false: a grid has at least two instants.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn step_size(&self) -> f64 {
        self.total_time / self.steps as f64
    }

    /// Time of sample `i`. Exact at both ends of the grid.
    pub fn time(&self, i: usize) -> f64 {
        if i == self.steps {
            // (T * n) / n can round away from T
            return self.total_time;
        }
        self.total_time * i as f64 / self.steps as f64
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..=self.steps).map(|i| self.time(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn endpoints_and_spacing() {
        let grid = TimeGrid::new(2.0, 1000).unwrap();
        assert_eq!(grid.len(), 1001);
        assert_eq!(grid.time(0), 0.0);
        assert_eq!(grid.time(1000), 2.0);
        assert!((grid.step_size() - 0.002).abs() < 1e-15);
        assert_eq!(grid.times().count(), 1001);
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(TimeGrid::new(0.0, 10).is_err());
        assert!(TimeGrid::new(-1.0, 10).is_err());
        assert!(TimeGrid::new(f64::NAN, 10).is_err());
        assert!(TimeGrid::new(f64::INFINITY, 10).is_err());
        assert!(TimeGrid::new(1.0, 0).is_err());
    }

    proptest! {
        #[test]
        fn grid_is_monotonic_and_closed(total in 1e-3f64..1e4, steps in 1usize..2_000) {
            let grid = TimeGrid::new(total, steps).unwrap();
            let t: Vec<f64> = grid.times().collect();
            prop_assert_eq!(t.len(), steps + 1);
            prop_assert_eq!(t[0], 0.0);
            prop_assert_eq!(t[steps], total);
            prop_assert!(t.windows(2).all(|w| w[1] > w[0]));
        }
    }
}
