//! SignalRule — absolute-momentum filter plus relative-momentum pick.

use crate::data::AlignedPair;
use crate::domain::{Asset, Position};
use crate::indicators::{Indicator, Momentum, Sma};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("{name} must be >= 1, got {value}")]
    InvalidWindow { name: &'static str, value: usize },
    #[error("not enough history: {required} dates required, {available} available")]
    InsufficientHistory { required: usize, available: usize },
}

/// One asset's view of the rule inputs on a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub price: f64,
    pub momentum: f64,
    pub ma: f64,
}

impl AssetSnapshot {
    /// Absolute-momentum filter: above its average and trending up.
    /// NaN inputs never pass.
    pub fn passes(&self) -> bool {
        self.price > self.ma && self.momentum > 0.0
    }

    /// Distance of price from its moving average, as a fraction of the average.
    pub fn bias(&self) -> f64 {
        (self.price - self.ma) / self.ma
    }
}

/// Why the rule picked its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalReason {
    BothBullishAStronger,
    BothBullishBStronger,
    OnlyABullish,
    OnlyBBullish,
    NoValidSignal,
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SignalReason::BothBullishAStronger => "both assets bullish, A stronger",
            SignalReason::BothBullishBStronger => "both assets bullish, B stronger",
            SignalReason::OnlyABullish => "A bullish, B weak",
            SignalReason::OnlyBBullish => "B bullish, A weak",
            SignalReason::NoValidSignal => "no valid signal",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDecision {
    pub target: Position,
    pub reason: SignalReason,
}

/// Dual-momentum rotation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRule {
    momentum_window: usize,
    ma_window: usize,
}

impl SignalRule {
    pub fn new(momentum_window: usize, ma_window: usize) -> Result<Self, SignalError> {
        if momentum_window == 0 {
            return Err(SignalError::InvalidWindow {
                name: "momentum_window",
                value: momentum_window,
            });
        }
        if ma_window == 0 {
            return Err(SignalError::InvalidWindow {
                name: "ma_window",
                value: ma_window,
            });
        }
        Ok(Self {
            momentum_window,
            ma_window,
        })
    }

    pub fn momentum_window(&self) -> usize {
        self.momentum_window
    }

    pub fn ma_window(&self) -> usize {
        self.ma_window
    }

    /// Index of the first evaluable date. Earlier dates are warm-up.
    pub fn warmup(&self) -> usize {
        self.momentum_window.max(self.ma_window) + 1
    }

    /// Pick a target from the two assets' snapshots.
    ///
    /// When both pass, A is chosen only on strictly greater momentum, so B
    /// wins exact ties.
    pub fn decide(&self, a: &AssetSnapshot, b: &AssetSnapshot) -> RuleDecision {
        let (target, reason) = match (a.passes(), b.passes()) {
            (true, true) if a.momentum > b.momentum => {
                (Position::AssetA, SignalReason::BothBullishAStronger)
            }
            (true, true) => (Position::AssetB, SignalReason::BothBullishBStronger),
            (true, false) => (Position::AssetA, SignalReason::OnlyABullish),
            (false, true) => (Position::AssetB, SignalReason::OnlyBBullish),
            (false, false) => (Position::Cash, SignalReason::NoValidSignal),
        };
        RuleDecision { target, reason }
    }

    /// Precompute momentum and moving-average series for both assets.
    pub fn precompute(&self, pair: &AlignedPair) -> RuleInputs {
        let series = |asset| {
            let closes = pair.closes(asset);
            AssetSeries {
                momentum: Momentum::new(self.momentum_window).compute(&closes),
                ma: Sma::new(self.ma_window).compute(&closes),
                closes,
            }
        };
        RuleInputs {
            rule: *self,
            a: series(Asset::A),
            b: series(Asset::B),
        }
    }
}

#[derive(Debug, Clone)]
struct AssetSeries {
    closes: Vec<f64>,
    momentum: Vec<f64>,
    ma: Vec<f64>,
}

/// Rule inputs precomputed over a whole aligned pair.
#[derive(Debug, Clone)]
pub struct RuleInputs {
    rule: SignalRule,
    a: AssetSeries,
    b: AssetSeries,
}

impl RuleInputs {
    pub fn len(&self) -> usize {
        self.a.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.closes.is_empty()
    }

    pub fn snapshot(&self, asset: Asset, index: usize) -> AssetSnapshot {
        let series = match asset {
            Asset::A => &self.a,
            Asset::B => &self.b,
        };
        AssetSnapshot {
            price: series.closes[index],
            momentum: series.momentum[index],
            ma: series.ma[index],
        }
    }

    pub fn decide_at(&self, index: usize) -> RuleDecision {
        self.rule.decide(
            &self.snapshot(Asset::A, index),
            &self.snapshot(Asset::B, index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn snap(price: f64, momentum: f64, ma: f64) -> AssetSnapshot {
        AssetSnapshot {
            price,
            momentum,
            ma,
        }
    }

    fn rule() -> SignalRule {
        SignalRule::new(20, 14).unwrap()
    }

    #[test]
    fn both_pass_picks_stronger() {
        let d = rule().decide(&snap(110.0, 0.05, 100.0), &snap(210.0, 0.03, 200.0));
        assert_eq!(d.target, Position::AssetA);
        assert_eq!(d.reason, SignalReason::BothBullishAStronger);

        let d = rule().decide(&snap(110.0, 0.02, 100.0), &snap(210.0, 0.03, 200.0));
        assert_eq!(d.target, Position::AssetB);
    }

    #[test]
    fn exact_tie_goes_to_b() {
        let d = rule().decide(&snap(110.0, 0.04, 100.0), &snap(210.0, 0.04, 200.0));
        assert_eq!(d.target, Position::AssetB);
        assert_eq!(d.reason, SignalReason::BothBullishBStronger);
    }

    #[test]
    fn single_pass_and_none() {
        let weak = snap(90.0, 0.05, 100.0);
        let strong = snap(110.0, 0.01, 100.0);
        assert_eq!(rule().decide(&strong, &weak).target, Position::AssetA);
        assert_eq!(rule().decide(&weak, &strong).target, Position::AssetB);
        let d = rule().decide(&weak, &snap(110.0, -0.01, 100.0));
        assert_eq!(d.target, Position::Cash);
        assert_eq!(d.reason, SignalReason::NoValidSignal);
    }

    #[test]
    fn nan_never_passes() {
        assert!(!snap(100.0, f64::NAN, 90.0).passes());
        assert!(!snap(100.0, 0.1, f64::NAN).passes());
    }

    #[test]
    fn price_equal_to_ma_fails() {
        assert!(!snap(100.0, 0.1, 100.0).passes());
    }

    #[test]
    fn warmup_is_longest_window_plus_one() {
        assert_eq!(SignalRule::new(20, 14).unwrap().warmup(), 21);
        assert_eq!(SignalRule::new(5, 30).unwrap().warmup(), 31);
    }

    #[test]
    fn zero_window_rejected() {
        assert!(matches!(
            SignalRule::new(0, 10),
            Err(SignalError::InvalidWindow { name: "momentum_window", .. })
        ));
        assert!(SignalRule::new(10, 0).is_err());
    }

    #[test]
    fn precomputed_inputs_are_defined_from_warmup() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let pair = AlignedPair::align(&bars, &bars).unwrap();
        let rule = SignalRule::new(5, 3).unwrap();
        let inputs = rule.precompute(&pair);
        let first = inputs.snapshot(Asset::A, rule.warmup());
        assert!(first.momentum.is_finite() && first.ma.is_finite());
        // rising closes: both pass, equal momentum, B takes the tie
        assert_eq!(inputs.decide_at(rule.warmup()).target, Position::AssetB);
    }

    #[test]
    fn decision_is_deterministic() {
        let a = snap(101.0, 0.03, 99.0);
        let b = snap(55.0, 0.02, 50.0);
        assert_eq!(rule().decide(&a, &b), rule().decide(&a, &b));
    }
}
