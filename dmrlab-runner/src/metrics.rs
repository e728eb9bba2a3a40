//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: equity curve and/or trade list in, scalar out.
//! Degenerate inputs (flat curves, no trades, a single point) give 0 rather
//! than an error or a NaN.

use chrono::NaiveDate;
use dmrlab_core::domain::Trade;
use dmrlab_core::engine::cost_model::TRADING_DAYS;
use serde::{Deserialize, Serialize};

/// Profit/loss ratio reported when there are trades but no losses.
pub const PROFIT_LOSS_CAP: f64 = 99.9;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annual_return: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub volatility: f64,
    pub calmar: f64,
    pub win_rate: f64,
    pub profit_loss_ratio: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub avg_holding_days: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve, its dates, and the trade list.
    pub fn compute(
        equity_curve: &[f64],
        dates: &[NaiveDate],
        trades: &[Trade],
        risk_free_rate: f64,
    ) -> Self {
        let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
        Self {
            total_return: total_return(equity_curve),
            annual_return: annual_return(equity_curve, dates),
            max_drawdown: max_drawdown(equity_curve),
            sharpe: sharpe_ratio(equity_curve, risk_free_rate),
            sortino: sortino_ratio(equity_curve, risk_free_rate),
            volatility: volatility(equity_curve),
            calmar: calmar_ratio(equity_curve, dates),
            win_rate: win_rate(trades),
            profit_loss_ratio: profit_loss_ratio(trades),
            total_trades: trades.len(),
            winning_trades,
            losing_trades: trades.len() - winning_trades,
            avg_holding_days: avg_holding_days(trades),
            max_consecutive_wins: max_consecutive_wins(trades),
            max_consecutive_losses: max_consecutive_losses(trades),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: last / first - 1.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&first), Some(&last)) if equity_curve.len() >= 2 && first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Annualized return over calendar time: (1 + total)^(365 / days) - 1.
///
/// Returns 0.0 when the curve spans no calendar days or lost everything.
pub fn annual_return(equity_curve: &[f64], dates: &[NaiveDate]) -> f64 {
    let days = match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) => (last - first).num_days(),
        _ => 0,
    };
    let growth = 1.0 + total_return(equity_curve);
    if days <= 0 || growth <= 0.0 {
        return 0.0;
    }
    growth.powf(365.0 / days as f64) - 1.0
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity never falls below a prior peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        peak = peak.max(eq);
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

/// Annualized Sharpe ratio.
///
/// Sharpe = (mean(daily) * 252 - rf) / (std(daily) * sqrt(252)).
/// Returns 0.0 if the daily returns have no variance.
pub fn sharpe_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean_f64(&returns) * TRADING_DAYS - risk_free_rate) / (std * TRADING_DAYS.sqrt())
}

/// Annualized Sortino ratio.
///
/// Same numerator as Sharpe; the denominator is the sample std of the
/// negative daily returns only, annualized. Returns 0.0 with fewer than two
/// negative days or no downside variance.
pub fn sortino_ratio(equity_curve: &[f64], risk_free_rate: f64) -> f64 {
    let returns = daily_returns(equity_curve);
    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_std = std_dev(&downside);
    if downside_std < 1e-15 {
        return 0.0;
    }
    (mean_f64(&returns) * TRADING_DAYS - risk_free_rate) / (downside_std * TRADING_DAYS.sqrt())
}

/// Annualized volatility of daily returns.
pub fn volatility(equity_curve: &[f64]) -> f64 {
    std_dev(&daily_returns(equity_curve)) * TRADING_DAYS.sqrt()
}

/// Calmar ratio: annual return / |max drawdown|. 0.0 without a drawdown.
pub fn calmar_ratio(equity_curve: &[f64], dates: &[NaiveDate]) -> f64 {
    let dd = max_drawdown(equity_curve);
    if dd >= 0.0 {
        return 0.0;
    }
    annual_return(equity_curve, dates) / dd.abs()
}

/// Win rate: fraction of trades with a positive return.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Mean winning return over mean absolute losing return.
///
/// Flat trades count as losses. With trades but no losses the ratio is
/// capped at `PROFIT_LOSS_CAP`; with no trades it is 0.0.
pub fn profit_loss_ratio(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let profits: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.return_pct)
        .collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.return_pct.abs())
        .collect();

    let avg_loss = mean_f64(&losses);
    if avg_loss <= 0.0 {
        return PROFIT_LOSS_CAP;
    }
    mean_f64(&profits) / avg_loss
}

/// Mean holding period in calendar days.
pub fn avg_holding_days(trades: &[Trade]) -> f64 {
    let days: Vec<f64> = trades.iter().map(|t| t.holding_days as f64).collect();
    mean_f64(&days)
}

/// Maximum consecutive winning trades.
pub fn max_consecutive_wins(trades: &[Trade]) -> usize {
    max_consecutive(trades, true)
}

/// Maximum consecutive losing trades.
pub fn max_consecutive_losses(trades: &[Trade]) -> usize {
    max_consecutive(trades, false)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Compute daily returns from an equity curve.
pub fn daily_returns(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[Trade], winners: bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;
    for trade in trades {
        if trade.is_winner() == winners {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmrlab_core::domain::{Asset, ExitReason};

    fn d(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn make_trade(return_pct: f64, holding_days: i64) -> Trade {
        Trade {
            asset: Asset::A,
            entry_date: d(0),
            exit_date: d(holding_days),
            entry_nav: 1.0,
            exit_nav: 1.0 + return_pct,
            return_pct,
            holding_days,
            exit_reason: ExitReason::SignalSwitch,
        }
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        (0..n as i64).map(d).collect()
    }

    // ── Returns ──

    #[test]
    fn total_return_basic() {
        assert!((total_return(&[1.0, 1.05, 1.1]) - 0.1).abs() < 1e-12);
        assert!((total_return(&[1.0, 0.9]) + 0.1).abs() < 1e-12);
        assert_eq!(total_return(&[1.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn annual_return_uses_calendar_days() {
        // 10% over exactly 365 calendar days is 10% a year
        let curve = [1.0, 1.1];
        let span = [d(0), d(365)];
        assert!((annual_return(&curve, &span) - 0.1).abs() < 1e-12);
        // same gain over half a year compounds to 21%
        let half = [d(0), d(182)];
        let expected = 1.1f64.powf(365.0 / 182.0) - 1.0;
        assert!((annual_return(&curve, &half) - expected).abs() < 1e-12);
    }

    #[test]
    fn annual_return_zero_span_is_zero() {
        assert_eq!(annual_return(&[1.0, 1.2], &[d(0), d(0)]), 0.0);
        assert_eq!(annual_return(&[], &[]), 0.0);
    }

    // ── Drawdown ──

    #[test]
    fn max_drawdown_from_running_peak() {
        let curve = [1.0, 1.2, 0.9, 1.3, 1.04];
        // worst is 0.9 against 1.2
        assert!((max_drawdown(&curve) + 0.25).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotone_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 1.1, 1.2]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Sharpe / Sortino ──

    #[test]
    fn sharpe_flat_curve_is_zero() {
        assert_eq!(sharpe_ratio(&[1.0; 50], 0.03), 0.0);
        assert_eq!(sortino_ratio(&[1.0; 50], 0.03), 0.0);
        assert_eq!(volatility(&[1.0; 50]), 0.0);
    }

    #[test]
    fn sharpe_matches_formula() {
        let curve = [1.0, 1.01, 0.9999, 1.019898, 1.00970];
        let r = daily_returns(&curve);
        let mean = r.iter().sum::<f64>() / r.len() as f64;
        let std = (r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (r.len() - 1) as f64).sqrt();
        let expected = (mean * 252.0 - 0.03) / (std * 252f64.sqrt());
        assert!((sharpe_ratio(&curve, 0.03) - expected).abs() < 1e-12);
    }

    #[test]
    fn sortino_needs_two_negative_days() {
        // only one down day: downside std undefined
        let one_down = [1.0, 1.02, 1.0, 1.03];
        assert_eq!(sortino_ratio(&one_down, 0.0), 0.0);

        let two_down = [1.0, 1.02, 1.0, 1.03, 1.0];
        let r = daily_returns(&two_down);
        let neg: Vec<f64> = r.iter().copied().filter(|&x| x < 0.0).collect();
        let expected = (mean_f64(&r) * 252.0) / (std_dev(&neg) * 252f64.sqrt());
        assert!((sortino_ratio(&two_down, 0.0) - expected).abs() < 1e-12);
    }

    // ── Calmar ──

    #[test]
    fn calmar_divides_by_drawdown() {
        let curve = [1.0, 0.8, 1.1];
        let span = [d(0), d(180), d(365)];
        let expected = annual_return(&curve, &span) / 0.2;
        assert!((calmar_ratio(&curve, &span) - expected).abs() < 1e-12);
        assert_eq!(calmar_ratio(&[1.0, 1.1], &[d(0), d(10)]), 0.0);
    }

    // ── Trades ──

    #[test]
    fn trade_stats_with_mixed_results() {
        let trades = vec![
            make_trade(0.10, 10),
            make_trade(-0.05, 4),
            make_trade(0.0, 2),
            make_trade(0.04, 8),
            make_trade(0.02, 6),
        ];
        assert!((win_rate(&trades) - 0.6).abs() < 1e-12);
        // avg win 0.0533.., avg loss (0.05 + 0) / 2
        let expected = ((0.10 + 0.04 + 0.02) / 3.0) / 0.025;
        assert!((profit_loss_ratio(&trades) - expected).abs() < 1e-12);
        assert!((avg_holding_days(&trades) - 6.0).abs() < 1e-12);
        assert_eq!(max_consecutive_wins(&trades), 2);
        assert_eq!(max_consecutive_losses(&trades), 2);
    }

    #[test]
    fn no_losses_hits_cap() {
        let trades = vec![make_trade(0.01, 3), make_trade(0.02, 3)];
        assert_eq!(profit_loss_ratio(&trades), PROFIT_LOSS_CAP);
    }

    #[test]
    fn no_trades_is_neutral() {
        let m = PerformanceMetrics::compute(&[1.0, 1.0], &dates(2), &[], 0.03);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_loss_ratio, 0.0);
        assert_eq!(m.avg_holding_days, 0.0);
        assert_eq!(m.sharpe, 0.0);
    }

    #[test]
    fn compute_counts_winners_and_losers() {
        let trades = vec![make_trade(0.03, 5), make_trade(-0.01, 5), make_trade(0.0, 5)];
        let m = PerformanceMetrics::compute(&[1.0, 1.02, 1.01], &dates(3), &trades, 0.0);
        assert_eq!(m.total_trades, 3);
        assert_eq!(m.winning_trades, 1);
        assert_eq!(m.losing_trades, 2);
    }
}
