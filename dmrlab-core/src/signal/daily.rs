//! Daily signal — today's recommended holding and the readings behind it.

use super::rule::{AssetSnapshot, SignalError, SignalReason, SignalRule};
use crate::data::AlignedPair;
use crate::domain::{Asset, Position};
use crate::gate::{GateThresholds, HysteresisGate};
use crate::walk_forward::RiskSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rule inputs for one asset on the signal date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetReading {
    pub asset: Asset,
    pub price: f64,
    pub momentum: f64,
    pub ma: f64,
    pub bias: f64,
    pub passes: bool,
}

impl AssetReading {
    fn from_snapshot(asset: Asset, snap: AssetSnapshot) -> Self {
        Self {
            asset,
            price: snap.price,
            momentum: snap.momentum,
            ma: snap.ma,
            bias: snap.bias(),
            passes: snap.passes(),
        }
    }
}

/// The recommendation for the last aligned date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    pub asset_a: AssetReading,
    pub asset_b: AssetReading,
    /// What the rotation rule alone would hold.
    pub rule_target: Position,
    pub rule_reason: SignalReason,
    pub risk_probability: f64,
    pub risk_off: bool,
    pub trigger: f64,
    pub release: f64,
    /// Final recommendation after the risk gate.
    pub target: Position,
    pub reason: String,
}

/// Build the signal for the last date of `pair`.
///
/// The gate state is replayed from the first post-warm-up date so that
/// today's risk-off flag reflects the full hysteresis history. Dates with
/// no probability feed 0 to the gate.
pub fn build_daily_signal(
    pair: &AlignedPair,
    rule: &SignalRule,
    risk: Option<&RiskSeries>,
    thresholds: GateThresholds,
) -> Result<Signal, SignalError> {
    let warmup = rule.warmup();
    let last = match pair.len().checked_sub(1) {
        Some(last) if last >= warmup => last,
        _ => {
            return Err(SignalError::InsufficientHistory {
                required: warmup + 1,
                available: pair.len(),
            })
        }
    };

    let inputs = rule.precompute(pair);
    let decision = inputs.decide_at(last);

    let mut gate = HysteresisGate::new(thresholds);
    let mut gate_decision = None;
    for &date in &pair.dates()[warmup..=last] {
        let p = risk.and_then(|r| r.get(date)).unwrap_or(0.0);
        gate_decision = Some(gate.update(p));
    }

    let (risk_probability, risk_off, target, reason) = match gate_decision {
        Some(g) if g.is_risk_off() => (g.probability, true, Position::Cash, g.to_string()),
        Some(g) => (g.probability, false, decision.target, decision.reason.to_string()),
        None => (0.0, false, decision.target, decision.reason.to_string()),
    };

    Ok(Signal {
        date: pair.dates()[last],
        asset_a: AssetReading::from_snapshot(Asset::A, inputs.snapshot(Asset::A, last)),
        asset_b: AssetReading::from_snapshot(Asset::B, inputs.snapshot(Asset::B, last)),
        rule_target: decision.target,
        rule_reason: decision.reason,
        risk_probability,
        risk_off,
        trigger: thresholds.trigger(),
        release: thresholds.release(),
        target,
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn rising_pair(n: usize) -> AlignedPair {
        let a: Vec<f64> = (0..n).map(|i| 100.0 * 1.01f64.powi(i as i32)).collect();
        let b: Vec<f64> = (0..n).map(|i| 100.0 * 1.005f64.powi(i as i32)).collect();
        AlignedPair::align(&make_bars(&a), &make_bars(&b)).unwrap()
    }

    #[test]
    fn without_risk_series_follows_rule() {
        let pair = rising_pair(30);
        let rule = SignalRule::new(5, 3).unwrap();
        let signal = build_daily_signal(&pair, &rule, None, GateThresholds::default()).unwrap();
        assert_eq!(signal.date, pair.last_date().unwrap());
        assert_eq!(signal.target, Position::AssetA);
        assert_eq!(signal.rule_target, Position::AssetA);
        assert!(!signal.risk_off);
        assert_eq!(signal.risk_probability, 0.0);
        assert!(signal.asset_a.passes && signal.asset_a.bias > 0.0);
        assert_eq!(signal.reason, "both assets bullish, A stronger");
    }

    #[test]
    fn replayed_gate_keeps_risk_off_in_dead_zone() {
        let pair = rising_pair(30);
        let rule = SignalRule::new(5, 3).unwrap();
        let dates = pair.dates();
        // spike above trigger then settle inside the dead zone
        let risk: RiskSeries = dates
            .iter()
            .enumerate()
            .map(|(i, &d)| (d, if i == 20 { 0.9 } else if i > 20 { 0.36 } else { 0.1 }))
            .collect();
        let signal =
            build_daily_signal(&pair, &rule, Some(&risk), GateThresholds::default()).unwrap();
        assert!(signal.risk_off);
        assert_eq!(signal.target, Position::Cash);
        assert_eq!(signal.rule_target, Position::AssetA);
        assert!((signal.risk_probability - 0.36).abs() < 1e-12);
        assert!(signal.reason.contains("staying risk-off"));
    }

    #[test]
    fn too_short_history_is_an_error() {
        let pair = rising_pair(6);
        let rule = SignalRule::new(5, 3).unwrap();
        let err = build_daily_signal(&pair, &rule, None, GateThresholds::default()).unwrap_err();
        assert_eq!(
            err,
            SignalError::InsufficientHistory {
                required: 7,
                available: 6
            }
        );
    }
}
