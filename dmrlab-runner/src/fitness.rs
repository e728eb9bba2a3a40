//! Fitness function — configurable metric selector for ranking grid cells.

use crate::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};

/// Which metric the optimizer maximizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMetric {
    #[default]
    Sharpe,
    Sortino,
    Calmar,
    TotalReturn,
    AnnualReturn,
    WinRate,
    MaxDrawdown,
}

impl FitnessMetric {
    /// Extract the relevant metric value from a PerformanceMetrics struct.
    pub fn extract(&self, metrics: &PerformanceMetrics) -> f64 {
        match self {
            Self::Sharpe => metrics.sharpe,
            Self::Sortino => metrics.sortino,
            Self::Calmar => metrics.calmar,
            Self::TotalReturn => metrics.total_return,
            Self::AnnualReturn => metrics.annual_return,
            Self::WinRate => metrics.win_rate,
            Self::MaxDrawdown => metrics.max_drawdown,
        }
    }

    /// Compare two metric values. Returns true if `a` is strictly better than `b`.
    ///
    /// Drawdowns are negative, so `a > b` also picks the shallower drawdown.
    pub fn is_better(&self, a: f64, b: f64) -> bool {
        a > b
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sharpe => "sharpe",
            Self::Sortino => "sortino",
            Self::Calmar => "calmar",
            Self::TotalReturn => "total_return",
            Self::AnnualReturn => "annual_return",
            Self::WinRate => "win_rate",
            Self::MaxDrawdown => "max_drawdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> PerformanceMetrics {
        PerformanceMetrics {
            total_return: 0.15,
            annual_return: 0.12,
            sharpe: 1.5,
            sortino: 2.0,
            calmar: 1.2,
            max_drawdown: -0.10,
            win_rate: 0.55,
            ..Default::default()
        }
    }

    #[test]
    fn extract_sharpe() {
        let m = sample_metrics();
        assert!((FitnessMetric::Sharpe.extract(&m) - 1.5).abs() < 1e-10);
    }

    #[test]
    fn extract_max_drawdown() {
        let m = sample_metrics();
        assert!((FitnessMetric::MaxDrawdown.extract(&m) - (-0.10)).abs() < 1e-10);
    }

    #[test]
    fn default_is_sharpe() {
        assert_eq!(FitnessMetric::default(), FitnessMetric::Sharpe);
    }

    #[test]
    fn equal_scores_are_not_better() {
        assert!(FitnessMetric::Sharpe.is_better(2.0, 1.5));
        assert!(!FitnessMetric::Sharpe.is_better(1.5, 1.5));
    }

    #[test]
    fn is_better_max_drawdown() {
        assert!(FitnessMetric::MaxDrawdown.is_better(-0.05, -0.20));
        assert!(!FitnessMetric::MaxDrawdown.is_better(-0.20, -0.05));
    }

    #[test]
    fn parses_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            metric: FitnessMetric,
        }
        let w: Wrapper = toml::from_str("metric = \"total_return\"").unwrap();
        assert_eq!(w.metric, FitnessMetric::TotalReturn);
        assert_eq!(w.metric.label(), "total_return");
    }
}
