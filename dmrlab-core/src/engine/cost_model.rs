//! Cost model — commission per leg and the cash yield.

use serde::{Deserialize, Serialize};

/// Trading days per year used to turn the annual cash rate into a daily one.
pub const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Fraction of NAV charged per leg (0.0003 = 3 bps).
    pub commission_rate: f64,
    /// Annual risk-free rate earned while in cash.
    pub risk_free_rate: f64,
}

impl CostModel {
    pub fn new(commission_rate: f64, risk_free_rate: f64) -> Self {
        Self {
            commission_rate,
            risk_free_rate,
        }
    }

    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn daily_cash_return(&self) -> f64 {
        self.risk_free_rate / TRADING_DAYS
    }

    /// NAV multiplier after paying `legs` commissions.
    pub fn cost_factor(&self, legs: u32) -> f64 {
        1.0 - self.commission_rate * f64::from(legs)
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(0.0003, 0.03)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_factor_scales_with_legs() {
        let c = CostModel::new(0.001, 0.0);
        assert_eq!(c.cost_factor(0), 1.0);
        assert!((c.cost_factor(1) - 0.999).abs() < 1e-15);
        assert!((c.cost_factor(2) - 0.998).abs() < 1e-15);
    }

    #[test]
    fn daily_cash_return_is_annual_over_252() {
        let c = CostModel::default();
        assert!((c.daily_cash_return() - 0.03 / 252.0).abs() < 1e-18);
        assert_eq!(CostModel::frictionless().daily_cash_return(), 0.0);
    }
}
