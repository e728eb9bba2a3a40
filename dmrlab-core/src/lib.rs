//! DMRLab Core — data, signals, risk model, and the rotation simulator.
//!
//! This crate contains the heart of the dual-momentum rotation backtester:
//! - Domain types (bars, positions, trades)
//! - Two-asset calendar alignment
//! - Rolling indicators and the risk feature pipeline
//! - The dual-momentum signal rule and the daily signal report
//! - Hysteresis risk gate
//! - Random-forest classifier behind a `Classifier` trait
//! - Purged walk-forward risk classifier
//! - Sequential day-by-day simulator

pub mod classifier;
pub mod data;
pub mod domain;
pub mod engine;
pub mod features;
pub mod gate;
pub mod indicators;
pub mod rng;
pub mod signal;
pub mod walk_forward;

pub use data::AlignedPair;
pub use domain::{Asset, Bar, ExitReason, Position, Trade};
pub use engine::{CostModel, SimulationOutput, Simulator};
pub use gate::{GateThresholds, HysteresisGate};
pub use signal::{build_daily_signal, Signal, SignalRule};
pub use walk_forward::{RiskClassifier, RiskForecast, RiskSeries, WalkForwardParams};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types handed across optimizer threads are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<data::AlignedPair>();
        require_sync::<data::AlignedPair>();
        require_send::<signal::SignalRule>();
        require_sync::<signal::SignalRule>();
        require_send::<engine::Simulator>();
        require_sync::<engine::Simulator>();
        require_send::<engine::SimulationOutput>();
        require_sync::<engine::SimulationOutput>();
        require_send::<walk_forward::RiskSeries>();
        require_sync::<walk_forward::RiskSeries>();
        require_send::<walk_forward::RiskForecast>();
        require_sync::<walk_forward::RiskForecast>();
        require_send::<walk_forward::RiskClassifier>();
        require_sync::<walk_forward::RiskClassifier>();
        require_send::<classifier::RandomForest>();
        require_sync::<classifier::RandomForest>();
        require_send::<features::FeatureFrame>();
        require_sync::<features::FeatureFrame>();
        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
    }

    /// Architecture contract: the rotation rule never sees NAV or holdings.
    ///
    /// `decide` takes only the two asset snapshots. If someone threads position
    /// state into it, this stops compiling.
    #[test]
    fn signal_rule_has_no_position_parameter() {
        fn _check(
            rule: &signal::SignalRule,
            a: &signal::AssetSnapshot,
            b: &signal::AssetSnapshot,
        ) -> signal::RuleDecision {
            rule.decide(a, b)
        }
    }
}
