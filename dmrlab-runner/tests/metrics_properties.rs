//! Property tests for the metrics engine.
//!
//! Tests:
//! 1. Max drawdown lies in [-1, 0] for any positive curve
//! 2. Ratios stay finite on arbitrary curves, including flat ones
//! 3. Trade statistics are bounded and counts add up

use chrono::{Duration, NaiveDate};
use dmrlab_core::domain::{Asset, ExitReason, Trade};
use dmrlab_runner::metrics::{self, PerformanceMetrics, PROFIT_LOSS_CAP};
use proptest::prelude::*;

fn dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap();
    (0..n as i64).map(|i| base + Duration::days(i)).collect()
}

fn curve_from_returns(returns: &[f64]) -> Vec<f64> {
    let mut nav = 1.0;
    let mut curve = vec![nav];
    for r in returns {
        nav *= 1.0 + r;
        curve.push(nav);
    }
    curve
}

fn trade(return_pct: f64) -> Trade {
    let entry = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    Trade {
        asset: Asset::A,
        entry_date: entry,
        exit_date: entry + Duration::days(5),
        entry_nav: 1.0,
        exit_nav: 1.0 + return_pct,
        return_pct,
        holding_days: 5,
        exit_reason: ExitReason::SignalSwitch,
    }
}

proptest! {
    #[test]
    fn drawdown_is_bounded(returns in prop::collection::vec(-0.09f64..0.09, 0..200)) {
        let curve = curve_from_returns(&returns);
        let dd = metrics::max_drawdown(&curve);
        prop_assert!(dd <= 0.0);
        prop_assert!(dd >= -1.0);
    }

    #[test]
    fn ratios_are_finite(
        returns in prop::collection::vec(-0.05f64..0.05, 0..200),
        flat in any::<bool>(),
    ) {
        let returns = if flat { vec![0.0; returns.len()] } else { returns };
        let curve = curve_from_returns(&returns);
        let m = PerformanceMetrics::compute(&curve, &dates(curve.len()), &[], 0.03);
        prop_assert!(m.sharpe.is_finite());
        prop_assert!(m.sortino.is_finite());
        prop_assert!(m.calmar.is_finite());
        prop_assert!(m.annual_return.is_finite());
        prop_assert!(m.volatility >= 0.0);
        if flat {
            prop_assert_eq!(m.sharpe, 0.0);
            prop_assert_eq!(m.total_return, 0.0);
        }
    }

    #[test]
    fn trade_stats_are_bounded(trade_returns in prop::collection::vec(-0.2f64..0.2, 0..40)) {
        let trades: Vec<Trade> = trade_returns.iter().map(|&r| trade(r)).collect();
        let m = PerformanceMetrics::compute(&[1.0, 1.0], &dates(2), &trades, 0.0);
        prop_assert!((0.0..=1.0).contains(&m.win_rate));
        prop_assert_eq!(m.winning_trades + m.losing_trades, trades.len());
        prop_assert!(m.profit_loss_ratio >= 0.0);
        prop_assert!(m.profit_loss_ratio <= PROFIT_LOSS_CAP || m.losing_trades > 0);
        prop_assert!(m.max_consecutive_wins <= m.winning_trades);
        prop_assert!(m.max_consecutive_losses <= m.losing_trades);
    }
}
