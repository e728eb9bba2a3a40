//! HysteresisGate — two-threshold risk-off state machine.
//!
//! NORMAL → RISK_OFF when p > trigger; RISK_OFF → NORMAL when p < release.
//! Anything in between leaves the state alone. Both comparisons are strict.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GateError {
    #[error("thresholds must lie in [0, 1], got trigger={trigger} release={release}")]
    OutOfRange { trigger: f64, release: f64 },
    #[error("trigger ({trigger}) must be greater than release ({release})")]
    Inverted { trigger: f64, release: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateThresholds {
    trigger: f64,
    release: f64,
}

impl GateThresholds {
    pub fn new(trigger: f64, release: f64) -> Result<Self, GateError> {
        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(trigger) || !in_unit(release) {
            return Err(GateError::OutOfRange { trigger, release });
        }
        if trigger <= release {
            return Err(GateError::Inverted { trigger, release });
        }
        Ok(Self { trigger, release })
    }

    pub fn trigger(&self) -> f64 {
        self.trigger
    }

    pub fn release(&self) -> f64 {
        self.release
    }
}

impl Default for GateThresholds {
    fn default() -> Self {
        Self {
            trigger: 0.40,
            release: 0.33,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateTransition {
    Tripped,
    Released,
    HeldRiskOff,
    HeldNormal,
}

/// Outcome of feeding one probability to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateDecision {
    pub probability: f64,
    pub transition: GateTransition,
    pub thresholds: GateThresholds,
}

impl GateDecision {
    pub fn is_risk_off(&self) -> bool {
        matches!(
            self.transition,
            GateTransition::Tripped | GateTransition::HeldRiskOff
        )
    }
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.probability * 100.0;
        let trigger = self.thresholds.trigger * 100.0;
        let release = self.thresholds.release * 100.0;
        match self.transition {
            GateTransition::Tripped => write!(
                f,
                "risk probability {p:.1}% above trigger {trigger:.0}%, entering risk-off"
            ),
            GateTransition::Released => write!(
                f,
                "risk probability {p:.1}% below release {release:.0}%, leaving risk-off"
            ),
            GateTransition::HeldRiskOff => write!(f, "risk probability {p:.1}%, staying risk-off"),
            GateTransition::HeldNormal => write!(f, "risk probability {p:.1}%, trading normally"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HysteresisGate {
    thresholds: GateThresholds,
    risk_off: bool,
}

impl HysteresisGate {
    pub fn new(thresholds: GateThresholds) -> Self {
        Self {
            thresholds,
            risk_off: false,
        }
    }

    pub fn is_risk_off(&self) -> bool {
        self.risk_off
    }

    pub fn thresholds(&self) -> GateThresholds {
        self.thresholds
    }

    pub fn update(&mut self, probability: f64) -> GateDecision {
        let transition = if !self.risk_off && probability > self.thresholds.trigger {
            self.risk_off = true;
            GateTransition::Tripped
        } else if self.risk_off && probability < self.thresholds.release {
            self.risk_off = false;
            GateTransition::Released
        } else if self.risk_off {
            GateTransition::HeldRiskOff
        } else {
            GateTransition::HeldNormal
        };
        GateDecision {
            probability,
            transition,
            thresholds: self.thresholds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gate() -> HysteresisGate {
        HysteresisGate::new(GateThresholds::default())
    }

    #[test]
    fn trips_above_trigger_and_releases_below_release() {
        let mut g = gate();
        assert_eq!(g.update(0.41).transition, GateTransition::Tripped);
        assert!(g.is_risk_off());
        assert_eq!(g.update(0.35).transition, GateTransition::HeldRiskOff);
        assert_eq!(g.update(0.32).transition, GateTransition::Released);
        assert!(!g.is_risk_off());
    }

    #[test]
    fn exactly_at_trigger_does_not_trip() {
        let mut g = gate();
        for _ in 0..10 {
            let d = g.update(0.40);
            assert_eq!(d.transition, GateTransition::HeldNormal);
        }
        assert!(!g.is_risk_off());
    }

    #[test]
    fn exactly_at_release_does_not_release() {
        let mut g = gate();
        g.update(0.9);
        assert_eq!(g.update(0.33).transition, GateTransition::HeldRiskOff);
    }

    #[test]
    fn thresholds_validated() {
        assert!(matches!(
            GateThresholds::new(0.3, 0.4),
            Err(GateError::Inverted { .. })
        ));
        assert!(matches!(
            GateThresholds::new(0.4, 0.4),
            Err(GateError::Inverted { .. })
        ));
        assert!(matches!(
            GateThresholds::new(1.2, 0.4),
            Err(GateError::OutOfRange { .. })
        ));
    }

    #[test]
    fn decision_display_names_the_state() {
        let mut g = gate();
        let d = g.update(0.45);
        assert_eq!(
            d.to_string(),
            "risk probability 45.0% above trigger 40%, entering risk-off"
        );
        assert!(d.is_risk_off());
    }

    proptest! {
        #[test]
        fn dead_zone_never_flips_risk_off(ps in prop::collection::vec(0.3301f64..=0.40, 1..50)) {
            let mut g = gate();
            g.update(0.99);
            for p in ps {
                g.update(p);
                prop_assert!(g.is_risk_off());
            }
        }

        #[test]
        fn below_release_always_clears(p in 0.0f64..0.33, pre in prop::collection::vec(0.0f64..=1.0, 0..20)) {
            let mut g = gate();
            for x in pre {
                g.update(x);
            }
            g.update(p);
            prop_assert!(!g.is_risk_off());
        }
    }
}
