//! Optimizer — grid search over (momentum window, MA window).
//!
//! Each cell runs the ungated simulator independently, so the grid fans out
//! over rayon. Results come back in input order and the best cell is picked
//! by a sequential merge, so the outcome does not depend on thread count.
//!
//! A cell passes when it beats buy-and-hold A measured from
//! `benchmark_offset` and keeps its max drawdown above the limit. The best
//! cell is the first passing cell, in momentum-major order, whose score is
//! strictly greater than every earlier one.
//!
//! Zero windows are rejected before any cell runs; only cells whose warm-up
//! outruns the history become `NoData`.

use dmrlab_core::data::AlignedPair;
use dmrlab_core::domain::Asset;
use dmrlab_core::engine::{EngineError, Simulator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{check_windows, ConfigError, DmrConfig};
use crate::fitness::FitnessMetric;
use crate::result::{BacktestResult, StrategyParameters};
use crate::runner::{run_backtest, RunError, DMR};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub metric: FitnessMetric,
    pub max_drawdown_limit: f64,
    pub benchmark_offset: usize,
    pub parallel: bool,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            metric: FitnessMetric::Sharpe,
            max_drawdown_limit: -0.20,
            benchmark_offset: 30,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    Pass,
    Fail,
    /// Too few dates after warm-up to simulate.
    NoData,
}

/// One evaluated grid cell. Metric fields are empty for `NoData` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub momentum_window: usize,
    pub ma_window: usize,
    pub status: CellStatus,
    pub score: Option<f64>,
    pub total_return: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe: Option<f64>,
    pub trades: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestCell {
    pub parameters: StrategyParameters,
    pub score: f64,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub metric: FitnessMetric,
    pub benchmark_return: f64,
    pub max_drawdown_limit: f64,
    /// Every cell in momentum-major order.
    pub rows: Vec<GridRow>,
    /// None when no cell passes.
    pub best: Option<BestCell>,
}

impl OptimizationResult {
    pub fn passed(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.status == CellStatus::Pass)
            .count()
    }
}

pub struct Optimizer {
    simulator: Simulator,
    settings: OptimizerSettings,
}

impl Optimizer {
    pub fn new(simulator: Simulator, settings: OptimizerSettings) -> Self {
        Self {
            simulator,
            settings,
        }
    }

    pub fn from_config(config: &DmrConfig) -> Result<Self, ConfigError> {
        let settings = OptimizerSettings {
            metric: config.optimizer.metric,
            max_drawdown_limit: config.trading.max_drawdown_limit,
            benchmark_offset: config.optimizer.benchmark_offset,
            parallel: config.optimizer.parallel,
        };
        Ok(Self::new(config.simulator()?, settings))
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Buy-and-hold return of asset A from `benchmark_offset` to the last date.
    ///
    /// 0.0 when the series does not reach past the offset.
    pub fn benchmark_return(&self, pair: &AlignedPair) -> f64 {
        let closes = pair.closes(Asset::A);
        match (closes.get(self.settings.benchmark_offset), closes.last()) {
            (Some(&start), Some(&end)) if start > 0.0 => end / start - 1.0,
            _ => 0.0,
        }
    }

    /// Evaluate every `(momentum, ma)` combination.
    pub fn optimize(
        &self,
        pair: &AlignedPair,
        momentum_windows: &[usize],
        ma_windows: &[usize],
    ) -> Result<OptimizationResult, RunError> {
        check_windows("momentum", momentum_windows)?;
        check_windows("ma", ma_windows)?;
        let benchmark = self.benchmark_return(pair);
        let cells: Vec<(usize, usize)> = momentum_windows
            .iter()
            .flat_map(|&m| ma_windows.iter().map(move |&a| (m, a)))
            .collect();

        let evaluated: Vec<(GridRow, Option<BacktestResult>)> = if self.settings.parallel {
            cells
                .par_iter()
                .map(|&(m, a)| self.evaluate(pair, m, a, benchmark))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            cells
                .iter()
                .map(|&(m, a)| self.evaluate(pair, m, a, benchmark))
                .collect::<Result<Vec<_>, _>>()?
        };

        let mut rows = Vec::with_capacity(evaluated.len());
        let mut best: Option<BestCell> = None;
        for (row, result) in evaluated {
            if let (CellStatus::Pass, Some(score), Some(result)) = (row.status, row.score, result) {
                let improves = match &best {
                    None => score.is_finite(),
                    Some(b) => self.settings.metric.is_better(score, b.score),
                };
                if improves {
                    best = Some(BestCell {
                        parameters: result.parameters,
                        score,
                        result,
                    });
                }
            }
            rows.push(row);
        }

        let result = OptimizationResult {
            metric: self.settings.metric,
            benchmark_return: benchmark,
            max_drawdown_limit: self.settings.max_drawdown_limit,
            rows,
            best,
        };
        match &result.best {
            Some(b) => tracing::info!(
                cells = result.rows.len(),
                passed = result.passed(),
                momentum_window = b.parameters.momentum_window,
                ma_window = b.parameters.ma_window,
                score = b.score,
                "grid search complete"
            ),
            None => tracing::info!(
                cells = result.rows.len(),
                benchmark,
                "grid search complete, no cell passed"
            ),
        }
        Ok(result)
    }

    fn evaluate(
        &self,
        pair: &AlignedPair,
        momentum_window: usize,
        ma_window: usize,
        benchmark: f64,
    ) -> Result<(GridRow, Option<BacktestResult>), RunError> {
        let result = match run_backtest(pair, &self.simulator, momentum_window, ma_window, None, DMR)
        {
            Ok(r) => r,
            Err(e @ RunError::Engine(EngineError::InsufficientData { .. })) => {
                tracing::debug!(momentum_window, ma_window, error = %e, "cell skipped");
                let row = GridRow {
                    momentum_window,
                    ma_window,
                    status: CellStatus::NoData,
                    score: None,
                    total_return: None,
                    max_drawdown: None,
                    sharpe: None,
                    trades: None,
                };
                return Ok((row, None));
            }
            Err(e) => return Err(e),
        };

        let m = &result.metrics;
        let passes =
            m.total_return > benchmark && m.max_drawdown > self.settings.max_drawdown_limit;
        let row = GridRow {
            momentum_window,
            ma_window,
            status: if passes {
                CellStatus::Pass
            } else {
                CellStatus::Fail
            },
            score: Some(self.settings.metric.extract(m)),
            total_return: Some(m.total_return),
            max_drawdown: Some(m.max_drawdown),
            sharpe: Some(m.sharpe),
            trades: Some(m.total_trades),
        };
        tracing::debug!(momentum_window, ma_window, status = ?row.status, "cell evaluated");
        Ok((row, Some(result)))
    }
}
