//! Domain types for dmrlab

pub mod bar;
pub mod position;
pub mod trade;

pub use bar::{Bar, BarError};
pub use position::{Asset, Position};
pub use trade::{ExitReason, Trade};
