//! Simple Moving Average (SMA).
//!
//! Mean of the trailing `period` values, current value included.
//! Lookback: period - 1 (first valid value at index period-1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &values[(i + 1 - self.period)..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            result[i] = window.iter().sum::<f64>() / self.period as f64;
        }
        result
    }
}
