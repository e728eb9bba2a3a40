//! Exponentially weighted mean with span-based decay.
//!
//! alpha = 2 / (span + 1). Uses the bias-adjusted form: each output is the
//! weighted average of all observations so far with weights (1 - alpha)^k,
//! k counted in positions from the newest. NaN inputs still age the weights
//! but contribute nothing, so the output carries the previous value.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ewm {
    span: usize,
    name: String,
}

impl Ewm {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EWM span must be >= 1");
        Self {
            span,
            name: format!("ewm_{span}"),
        }
    }

    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }
}

impl Indicator for Ewm {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, values: &[f64]) -> Vec<f64> {
        let decay = 1.0 - self.alpha();
        let mut numerator = 0.0;
        let mut denominator = 0.0;

        values
            .iter()
            .map(|&x| {
                numerator *= decay;
                denominator *= decay;
                if !x.is_nan() {
                    numerator += x;
                    denominator += 1.0;
                }
                if denominator > 0.0 {
                    numerator / denominator
                } else {
                    f64::NAN
                }
            })
            .collect()
    }
}
