//! Rotation signal — the dual-momentum rule and the daily signal report.
//!
//! The rule is a pure function of the two price histories up to and
//! including the evaluation date. It never sees NAV, holdings, or the risk
//! gate; the simulator and the daily report layer those on top.

pub mod daily;
pub mod rule;

pub use daily::{build_daily_signal, AssetReading, Signal};
pub use rule::{AssetSnapshot, RuleDecision, RuleInputs, SignalError, SignalReason, SignalRule};
