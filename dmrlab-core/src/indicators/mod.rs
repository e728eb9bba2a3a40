//! Rolling statistics over plain `f64` series.
//!
//! Every indicator here maps an input series to an output of the same length,
//! with NaN wherever the window is not yet full or contains a NaN. Signal
//! evaluation and the feature pipeline both read from these precomputed
//! vectors instead of recomputing windows per date.

pub mod ewm;
pub mod momentum;
pub mod rolling;
pub mod sma;

pub use ewm::Ewm;
pub use momentum::Momentum;
pub use rolling::{lag, rolling_corr, RollingStd};
pub use sma::Sma;

/// A single-input rolling indicator.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    /// Number of leading outputs that are always NaN.
    fn lookback(&self) -> usize;

    fn compute(&self, values: &[f64]) -> Vec<f64>;
}

/// Create daily bars from close prices for testing.
///
/// `pct_chg` is derived from consecutive closes (0 on the first bar) so the
/// simulator's settlement agrees with the price path. Volume is 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let pct_chg = if i == 0 {
                0.0
            } else {
                (close / closes[i - 1] - 1.0) * 100.0
            };
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                close,
                pct_chg,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
