//! Rolling dispersion and co-movement statistics.

use super::Indicator;

/// Rolling sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone)]
pub struct RollingStd {
    period: usize,
    name: String,
}

impl RollingStd {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RollingStd period must be >= 2");
        Self {
            period,
            name: format!("std_{period}"),
        }
    }
}

impl Indicator for RollingStd {
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
            let mean = window.iter().sum::<f64>() / self.period as f64;
            let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (self.period - 1) as f64;
            result[i] = var.sqrt();
        }
        result
    }
}

/// Rolling Pearson correlation of two equally long series.
///
/// NaN where either window contains a NaN or has zero variance.
pub fn rolling_corr(x: &[f64], y: &[f64], period: usize) -> Vec<f64> {
    assert_eq!(x.len(), y.len(), "rolling_corr inputs must have equal length");
    assert!(period >= 2, "rolling_corr period must be >= 2");
    let n = x.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let wx = &x[(i + 1 - period)..=i];
        let wy = &y[(i + 1 - period)..=i];
        if wx.iter().chain(wy).any(|v| v.is_nan()) {
            continue;
        }
        let mx = wx.iter().sum::<f64>() / period as f64;
        let my = wy.iter().sum::<f64>() / period as f64;
        let mut cov = 0.0;
        let mut vx = 0.0;
        let mut vy = 0.0;
        for (a, b) in wx.iter().zip(wy) {
            cov += (a - mx) * (b - my);
            vx += (a - mx).powi(2);
            vy += (b - my).powi(2);
        }
        let denom = (vx * vy).sqrt();
        if denom > 1e-15 {
            result[i] = cov / denom;
        }
    }
    result
}

/// Shift a series forward by `k` positions, NaN-filling the front.
pub fn lag(values: &[f64], k: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if k < n {
        result[k..].copy_from_slice(&values[..n - k]);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_std_matches_sample_std() {
        let result = RollingStd::new(4).compute(&[2.0, 4.0, 4.0, 4.0, 5.0]);
        assert!(result[2].is_nan());
        // mean 3.5, squared deviations 2.25 + 0.25*3 = 3.0, / 3 = 1.0
        assert_approx(result[3], 1.0, DEFAULT_EPSILON);
        // window [4,4,4,5]: mean 4.25, ss = 0.1875 + 0.5625 = 0.75, / 3 = 0.25
        assert_approx(result[4], 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_corr_perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let up = [2.0, 4.0, 6.0, 8.0, 10.0];
        let down = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert_approx(rolling_corr(&x, &up, 3)[4], 1.0, 1e-12);
        assert_approx(rolling_corr(&x, &down, 3)[4], -1.0, 1e-12);
    }

    #[test]
    fn rolling_corr_zero_variance_is_nan() {
        let x = [1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0];
        assert!(rolling_corr(&x, &y, 3)[2].is_nan());
    }

    #[test]
    fn lag_shifts_forward() {
        let result = lag(&[1.0, 2.0, 3.0], 1);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[1.0, 2.0]);
        assert!(lag(&[1.0], 3)[0].is_nan());
    }
}
