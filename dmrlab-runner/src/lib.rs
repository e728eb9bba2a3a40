//! DMR Lab Runner — backtest orchestration on top of `dmrlab-core`.
//!
//! This crate provides:
//! - CSV data loading and two-asset alignment
//! - TOML configuration with validation
//! - Performance metrics and backtest result assembly
//! - Grid-search optimizer, sensitivity analysis, strategy comparison
//! - Artifact export (manifest JSON, equity/trade/grid CSV)

pub mod compare;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod fitness;
pub mod metrics;
pub mod optimizer;
pub mod result;
pub mod runner;
pub mod sensitivity;

pub use compare::{buy_and_hold, compare_strategies, StrategyComparison};
pub use config::{ConfigError, DmrConfig, RangeSpec};
pub use data_loader::{load_bars, load_pair, read_bars, LoadError};
pub use export::{save_artifacts, save_grid, save_json, ExportError, Manifest};
pub use fitness::FitnessMetric;
pub use metrics::PerformanceMetrics;
pub use optimizer::{CellStatus, GridRow, OptimizationResult, Optimizer, OptimizerSettings};
pub use result::{BacktestResult, EquityPoint, RunId, StrategyParameters};
pub use runner::{daily_signal, run_backtest, train_risk_model, RunError};
pub use sensitivity::{analyze_sensitivity, SensitivityPoint, SensitivityReport};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<DmrConfig>();
        assert_sync::<DmrConfig>();
        assert_send::<OptimizerSettings>();
        assert_sync::<OptimizerSettings>();
    }

    #[test]
    fn optimizer_is_sync() {
        // cells are evaluated from rayon workers through &Optimizer
        assert_sync::<Optimizer>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<OptimizationResult>();
        assert_sync::<OptimizationResult>();
        assert_send::<SensitivityReport>();
        assert_sync::<SensitivityReport>();
        assert_send::<StrategyComparison>();
        assert_sync::<StrategyComparison>();
    }
}
