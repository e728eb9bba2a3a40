//! Momentum — trailing percentage return.
//!
//! momentum[t] = close[t] / close[t - period - 1] - 1
//! Lookback: period + 1. The extra day matches the rotation rule's
//! definition of an N-day momentum window.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Momentum period must be >= 1");
        Self {
            period,
            name: format!("momentum_{period}"),
        }
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        let lookback = self.lookback();

        for i in lookback..n {
            let prev = values[i - lookback];
            let curr = values[i];
            if prev.is_nan() || curr.is_nan() || prev == 0.0 {
                continue;
            }
            result[i] = curr / prev - 1.0;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn momentum_reaches_back_period_plus_one() {
        let result = Momentum::new(2).compute(&[100.0, 110.0, 105.0, 120.0, 121.0]);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        // 120 / 100 - 1
        assert_approx(result[3], 0.2, DEFAULT_EPSILON);
        // 121 / 110 - 1
        assert_approx(result[4], 0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn momentum_flat_series_is_zero() {
        let result = Momentum::new(3).compute(&[50.0; 8]);
        for v in &result[4..] {
            assert_approx(*v, 0.0, DEFAULT_EPSILON);
        }
    }
}
