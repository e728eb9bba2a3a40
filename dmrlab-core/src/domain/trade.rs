//! Trade — a closed holding period of one asset.

use super::position::Asset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a holding was closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitReason {
    /// The risk gate tripped on the exit date with this smoothed probability.
    RiskTriggered { probability: f64 },
    /// The rotation rule picked a different target.
    SignalSwitch,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::RiskTriggered { probability } => {
                write!(f, "ML risk triggered ({:.1}%)", probability * 100.0)
            }
            ExitReason::SignalSwitch => write!(f, "signal switch"),
        }
    }
}

/// A completed holding: entry → exit, measured on the strategy NAV.
///
/// `entry_nav` is net of the entry commission; `exit_nav` is the NAV settled
/// on the exit date before the exit commission is deducted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub asset: Asset,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_nav: f64,
    pub exit_nav: f64,
    pub return_pct: f64,
    /// Calendar days between entry and exit.
    pub holding_days: i64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(return_pct: f64) -> Trade {
        Trade {
            asset: Asset::B,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 19).unwrap(),
            entry_nav: 1.0,
            exit_nav: 1.0 + return_pct,
            return_pct,
            holding_days: 14,
            exit_reason: ExitReason::SignalSwitch,
        }
    }

    #[test]
    fn winner_requires_positive_return() {
        assert!(sample_trade(0.02).is_winner());
        assert!(!sample_trade(0.0).is_winner());
        assert!(!sample_trade(-0.01).is_winner());
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::SignalSwitch.to_string(), "signal switch");
        let risk = ExitReason::RiskTriggered { probability: 0.4123 };
        assert_eq!(risk.to_string(), "ML risk triggered (41.2%)");
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = Trade {
            exit_reason: ExitReason::RiskTriggered { probability: 0.45 },
            ..sample_trade(0.03)
        };
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
