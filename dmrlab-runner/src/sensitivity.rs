//! Parameter sensitivity — how the ungated rotation reacts to each window.
//!
//! Each axis is swept over `base - 2δ ..= base + 2δ` in steps of `δ` with the
//! other window held at its base value. Swept values that drop to zero or
//! below are skipped; a zero base window is rejected.

use dmrlab_core::data::AlignedPair;
use dmrlab_core::engine::{EngineError, Simulator};
use serde::{Deserialize, Serialize};

use crate::config::check_windows;
use crate::runner::{run_backtest, RunError, DMR};

pub const DEFAULT_MOMENTUM_DELTA: usize = 5;
pub const DEFAULT_MA_DELTA: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: usize,
    pub sharpe: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_momentum: usize,
    pub base_ma: usize,
    pub momentum: Vec<SensitivityPoint>,
    pub ma: Vec<SensitivityPoint>,
}

/// Sweep each window around its base value.
///
/// Values that leave no dates after warm-up are omitted from the report.
pub fn analyze_sensitivity(
    pair: &AlignedPair,
    simulator: &Simulator,
    base_momentum: usize,
    base_ma: usize,
    momentum_delta: usize,
    ma_delta: usize,
) -> Result<SensitivityReport, RunError> {
    check_windows("momentum", &[base_momentum])?;
    check_windows("ma", &[base_ma])?;

    let mut momentum = Vec::new();
    for m in sweep_values(base_momentum, momentum_delta) {
        momentum.extend(point(pair, simulator, m, base_ma, m)?);
    }
    let mut ma = Vec::new();
    for a in sweep_values(base_ma, ma_delta) {
        ma.extend(point(pair, simulator, base_momentum, a, a)?);
    }

    Ok(SensitivityReport {
        base_momentum,
        base_ma,
        momentum,
        ma,
    })
}

fn sweep_values(base: usize, delta: usize) -> Vec<usize> {
    let base = base as i64;
    let delta = delta as i64;
    let mut values: Vec<usize> = (-2..=2)
        .map(|k| base + k * delta)
        .filter(|&v| v > 0)
        .map(|v| v as usize)
        .collect();
    values.dedup();
    values
}

fn point(
    pair: &AlignedPair,
    simulator: &Simulator,
    momentum_window: usize,
    ma_window: usize,
    value: usize,
) -> Result<Option<SensitivityPoint>, RunError> {
    match run_backtest(pair, simulator, momentum_window, ma_window, None, DMR) {
        Ok(r) => Ok(Some(SensitivityPoint {
            value,
            sharpe: r.metrics.sharpe,
            total_return: r.metrics.total_return,
            max_drawdown: r.metrics.max_drawdown,
        })),
        Err(e @ RunError::Engine(EngineError::InsufficientData { .. })) => {
            tracing::debug!(momentum_window, ma_window, error = %e, "sensitivity point skipped");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
