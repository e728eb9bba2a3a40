//! Backtesting engine — the sequential daily rotation loop.
//!
//! One pass over the aligned calendar, in date order:
//!
//! 1. Settle the previous holding's return into NAV
//! 2. Evaluate the rotation rule on prices up to today
//! 3. Feed today's risk probability (if any) to the hysteresis gate
//! 4. On a target change: book the closing trade, charge commission, open the new one
//!
//! Every day's state depends on the day before, so the loop never reorders
//! or parallelizes; the optimizer parallelizes across whole runs instead.

pub mod cost_model;
pub mod simulator;
pub mod trade_book;

pub use cost_model::CostModel;
pub use simulator::{DayRecord, EngineError, SimulationOutput, Simulator};
pub use trade_book::{OpenHolding, TradeBook};
