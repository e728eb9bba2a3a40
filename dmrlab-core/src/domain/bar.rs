//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily bar for a single asset.
///
/// `pct_chg` is the provider's daily percentage change (1.5 = +1.5%), which is
/// what the simulator settles P&L against. Closes drive the signal rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub pct_chg: f64,
    pub volume: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar on {date}: close must be finite and positive, got {close}")]
    InvalidClose { date: NaiveDate, close: f64 },
    #[error("bar on {date}: pct_chg must be finite, got {pct_chg}")]
    InvalidChange { date: NaiveDate, pct_chg: f64 },
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64, pct_chg: f64, volume: f64) -> Self {
        Self {
            date,
            close,
            pct_chg,
            volume,
        }
    }

    /// Daily return as a fraction.
    pub fn daily_return(&self) -> f64 {
        self.pct_chg / 100.0
    }

    /// Checks the fields the engine relies on. Volume may be NaN (feature
    /// rows simply go missing), prices may not.
    pub fn validate(&self) -> Result<(), BarError> {
        if !self.close.is_finite() || self.close <= 0.0 {
            return Err(BarError::InvalidClose {
                date: self.date,
                close: self.close,
            });
        }
        if !self.pct_chg.is_finite() {
            return Err(BarError::InvalidChange {
                date: self.date,
                pct_chg: self.pct_chg,
            });
        }
        Ok(())
    }
}
