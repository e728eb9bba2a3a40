//! Backtest result — the equity curve, trade log and metrics of one strategy run.

use crate::metrics::PerformanceMetrics;
use chrono::NaiveDate;
use dmrlab_core::domain::{Position, Trade};
use dmrlab_core::engine::SimulationOutput;
use serde::{Deserialize, Serialize};

/// Content hash identifying a result or a configured run.
pub type RunId = String;

/// Complete result of a backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestResult {
    /// blake3 of the strategy name, parameters and date range
    pub run_id: RunId,

    /// Display name, e.g. "DMR" or "DMR-ML"
    pub strategy: String,

    pub parameters: StrategyParameters,

    /// Daily NAV from the first post-warm-up date
    pub equity_curve: Vec<EquityPoint>,

    /// Closed trades in chronological order
    pub trades: Vec<Trade>,

    pub metrics: PerformanceMetrics,

    /// Holding at the close of the final date
    pub final_position: Position,
}

/// Rotation windows a result was produced with. Zero for the benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrategyParameters {
    pub momentum_window: usize,
    pub ma_window: usize,
}

/// Single point in the equity curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub nav: f64,
}

impl BacktestResult {
    /// Assemble a result from simulator output.
    pub fn from_simulation(
        strategy: impl Into<String>,
        output: SimulationOutput,
        risk_free_rate: f64,
    ) -> Self {
        let parameters = StrategyParameters {
            momentum_window: output.rule.momentum_window(),
            ma_window: output.rule.ma_window(),
        };
        let final_position = output.final_position();
        let equity_curve = output
            .days
            .iter()
            .map(|d| EquityPoint {
                date: d.date,
                nav: d.nav,
            })
            .collect();
        Self::assemble(
            strategy.into(),
            parameters,
            equity_curve,
            output.trades,
            final_position,
            risk_free_rate,
        )
    }

    /// Assemble a result from an arbitrary NAV path.
    pub fn assemble(
        strategy: String,
        parameters: StrategyParameters,
        equity_curve: Vec<EquityPoint>,
        trades: Vec<Trade>,
        final_position: Position,
        risk_free_rate: f64,
    ) -> Self {
        let navs: Vec<f64> = equity_curve.iter().map(|p| p.nav).collect();
        let dates: Vec<NaiveDate> = equity_curve.iter().map(|p| p.date).collect();
        let metrics = PerformanceMetrics::compute(&navs, &dates, &trades, risk_free_rate);
        let run_id = result_id(&strategy, parameters, dates.first(), dates.last());
        Self {
            run_id,
            strategy,
            parameters,
            equity_curve,
            trades,
            metrics,
            final_position,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.equity_curve.first().map(|p| p.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.equity_curve.last().map(|p| p.date)
    }

    pub fn navs(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.nav).collect()
    }
}

fn result_id(
    strategy: &str,
    parameters: StrategyParameters,
    start: Option<&NaiveDate>,
    end: Option<&NaiveDate>,
) -> RunId {
    let key = serde_json::json!({
        "strategy": strategy,
        "parameters": parameters,
        "start": start,
        "end": end,
    });
    blake3::hash(key.to_string().as_bytes()).to_hex().to_string()
}
