//! Backtest runner — wires the simulator, the risk model and metrics together.

use dmrlab_core::data::AlignedPair;
use dmrlab_core::domain::Asset;
use dmrlab_core::engine::{EngineError, Simulator};
use dmrlab_core::signal::{build_daily_signal, Signal, SignalError, SignalRule};
use dmrlab_core::walk_forward::{RiskClassifier, RiskForecast, RiskSeries, WalkForwardError};
use thiserror::Error;

use crate::config::{ConfigError, DmrConfig};
use crate::data_loader::LoadError;
use crate::result::BacktestResult;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("simulation error: {0}")]
    Engine(#[from] EngineError),
    #[error("risk model error: {0}")]
    RiskModel(#[from] WalkForwardError),
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Strategy names used in results and reports.
pub const DMR: &str = "DMR";
pub const DMR_ML: &str = "DMR-ML";
pub const BENCHMARK: &str = "Benchmark";

/// Simulate one parameter pair and assemble its result.
///
/// Metrics use the simulator's own risk-free rate.
pub fn run_backtest(
    pair: &AlignedPair,
    simulator: &Simulator,
    momentum_window: usize,
    ma_window: usize,
    risk: Option<&RiskSeries>,
    strategy: &str,
) -> Result<BacktestResult, RunError> {
    let output = simulator.run(pair, momentum_window, ma_window, risk)?;
    let result = BacktestResult::from_simulation(strategy, output, simulator.costs().risk_free_rate);
    tracing::debug!(
        strategy,
        momentum_window,
        ma_window,
        total_return = result.metrics.total_return,
        sharpe = result.metrics.sharpe,
        trades = result.metrics.total_trades,
        "backtest complete"
    );
    Ok(result)
}

/// Train the walk-forward risk model on asset A's bars.
pub fn train_risk_model(pair: &AlignedPair, config: &DmrConfig) -> Result<RiskForecast, RunError> {
    let classifier = RiskClassifier::new(config.walk_forward_params(), config.forest_params())?;
    let forecast = classifier.fit_predict_bars(pair.bars(Asset::A))?;
    Ok(forecast)
}

/// Today's signal at the configured default windows.
pub fn daily_signal(
    pair: &AlignedPair,
    config: &DmrConfig,
    risk: Option<&RiskSeries>,
) -> Result<Signal, RunError> {
    let rule = SignalRule::new(
        config.strategy.default_momentum_window,
        config.strategy.default_ma_window,
    )?;
    let signal = build_daily_signal(pair, &rule, risk, config.gate_thresholds()?)?;
    Ok(signal)
}
