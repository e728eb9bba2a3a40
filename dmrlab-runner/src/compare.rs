//! Strategy comparison — ungated rotation, gated rotation and buy-and-hold A.

use dmrlab_core::data::AlignedPair;
use dmrlab_core::domain::{Asset, Position};
use dmrlab_core::engine::Simulator;
use dmrlab_core::walk_forward::RiskSeries;
use serde::{Deserialize, Serialize};

use crate::result::{BacktestResult, EquityPoint, StrategyParameters};
use crate::runner::{run_backtest, RunError, BENCHMARK, DMR, DMR_ML};

/// The three results of one comparison, over the same date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub dmr: BacktestResult,
    pub dmr_ml: BacktestResult,
    pub benchmark: BacktestResult,
}

impl StrategyComparison {
    /// Results in display order: DMR, DMR-ML, Benchmark.
    pub fn iter(&self) -> impl Iterator<Item = &BacktestResult> {
        [&self.dmr, &self.dmr_ml, &self.benchmark].into_iter()
    }

    pub fn get(&self, strategy: &str) -> Option<&BacktestResult> {
        self.iter().find(|r| r.strategy == strategy)
    }

    /// Fixed-width text table of the headline metrics.
    pub fn summary_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>10} {:>8} {:>8} {:>8} {:>7}\n",
            "strategy", "total", "annual", "max_dd", "sharpe", "sortino", "win", "trades"
        ));
        for r in self.iter() {
            let m = &r.metrics;
            out.push_str(&format!(
                "{:<10} {:>9.2}% {:>9.2}% {:>9.2}% {:>8.3} {:>8.3} {:>7.1}% {:>7}\n",
                r.strategy,
                m.total_return * 100.0,
                m.annual_return * 100.0,
                m.max_drawdown * 100.0,
                m.sharpe,
                m.sortino,
                m.win_rate * 100.0,
                m.total_trades,
            ));
        }
        out
    }
}

/// Run DMR (no gating), DMR-ML (gated by `risk`) and buy-and-hold A.
///
/// The benchmark covers the same dates as the rotation results.
pub fn compare_strategies(
    pair: &AlignedPair,
    simulator: &Simulator,
    momentum_window: usize,
    ma_window: usize,
    risk: &RiskSeries,
) -> Result<StrategyComparison, RunError> {
    let dmr = run_backtest(pair, simulator, momentum_window, ma_window, None, DMR)?;
    let dmr_ml = run_backtest(pair, simulator, momentum_window, ma_window, Some(risk), DMR_ML)?;
    let start = dmr
        .start_date()
        .and_then(|d| pair.index_of(d))
        .unwrap_or(0);
    let benchmark = buy_and_hold(pair, start, simulator.costs().risk_free_rate);

    tracing::info!(
        dmr = dmr.metrics.total_return,
        dmr_ml = dmr_ml.metrics.total_return,
        benchmark = benchmark.metrics.total_return,
        "strategy comparison complete"
    );
    Ok(StrategyComparison {
        dmr,
        dmr_ml,
        benchmark,
    })
}

/// Asset A held from `start` to the last date, NAV normalized to 1.0.
pub fn buy_and_hold(pair: &AlignedPair, start: usize, risk_free_rate: f64) -> BacktestResult {
    let bars = pair.bars(Asset::A);
    let equity_curve = match bars.get(start) {
        Some(first) => bars[start..]
            .iter()
            .map(|b| EquityPoint {
                date: b.date,
                nav: b.close / first.close,
            })
            .collect(),
        None => Vec::new(),
    };
    BacktestResult::assemble(
        BENCHMARK.to_string(),
        StrategyParameters::default(),
        equity_curve,
        Vec::new(),
        Position::AssetA,
        risk_free_rate,
    )
}
