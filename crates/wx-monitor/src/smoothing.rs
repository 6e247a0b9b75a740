//! Fixed-weight exponential moving average
//!
//! `avg' = avg * (N-1)/N + sample / N`

/// Weight giving roughly two minutes of anemometer samples
pub const WIND_WINDOW: u32 = 40;

/// Exponential moving average over a scalar signal
///
/// Starts at zero and folds in every sample, so a single gust moves the
/// average by only `1/N` of its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAverage {
    window: u32,
    value: f64,
}

impl MovingAverage {
    /// Create a zero average with window `N`
    ///
    /// A window of zero is treated as one (no smoothing).
    pub const fn new(window: u32) -> Self {
        Self {
            window: if window == 0 { 1 } else { window },
            value: 0.0,
        }
    }

    /// Fold in a sample, returning the updated average
    pub fn update(&mut self, sample: f64) -> f64 {
        let n = f64::from(self.window);
        self.value = self.value * (n - 1.0) / n + sample / n;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn window(&self) -> u32 {
        self.window
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(WIND_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_first_sample_is_folded_into_zero() {
        let mut avg = MovingAverage::default();
        assert_eq!(avg.value(), 0.0);
        assert!((avg.update(20.0) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_weighting() {
        let mut avg = MovingAverage::new(40);
        avg.update(40.0);
        let next = avg.update(2.0);
        // 1.0 * 39/40 + 2.0/40
        assert!((next - 1.025).abs() < EPSILON);
    }

    #[test]
    fn test_converges_monotonically_within_bounds() {
        let mut avg = MovingAverage::new(WIND_WINDOW);

        let target = 10.0;
        let mut previous = avg.value();
        for _ in 0..1000 {
            let next = avg.update(target);
            assert!(
                next >= previous - EPSILON,
                "average went backwards: {previous} -> {next}"
            );
            assert!(next <= target + EPSILON, "average overshot: {next}");
            previous = next;
        }
        assert!((target - previous).abs() < 1e-3);
    }

    #[test]
    fn test_never_exceeds_largest_sample() {
        let mut avg = MovingAverage::new(WIND_WINDOW);
        for sample in [3.0, 12.0, 0.5, 12.0, 7.0] {
            assert!(avg.update(sample) <= 12.0);
        }
    }

    #[test]
    fn test_zero_window_does_not_divide_by_zero() {
        let mut avg = MovingAverage::new(0);
        assert_eq!(avg.window(), 1);
        avg.update(3.0);
        assert!((avg.update(7.0) - 7.0).abs() < EPSILON);
    }
}
