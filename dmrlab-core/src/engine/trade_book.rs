//! Trade book — at most one open holding, closed trades in order.

use crate::domain::{Asset, ExitReason, Trade};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenHolding {
    pub asset: Asset,
    pub entry_date: NaiveDate,
    /// NAV right after the entry commission.
    pub entry_nav: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeBook {
    open: Option<OpenHolding>,
    trades: Vec<Trade>,
}

impl TradeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a holding. Any holding still open is replaced, so callers close
    /// first.
    pub fn open(&mut self, asset: Asset, entry_date: NaiveDate, entry_nav: f64) {
        debug_assert!(self.open.is_none(), "opening over an open holding");
        self.open = Some(OpenHolding {
            asset,
            entry_date,
            entry_nav,
        });
    }

    /// Close the open holding at `exit_nav`, returning the booked trade.
    pub fn close(
        &mut self,
        exit_date: NaiveDate,
        exit_nav: f64,
        exit_reason: ExitReason,
    ) -> Option<&Trade> {
        let holding = self.open.take()?;
        self.trades.push(Trade {
            asset: holding.asset,
            entry_date: holding.entry_date,
            exit_date,
            entry_nav: holding.entry_nav,
            exit_nav,
            return_pct: exit_nav / holding.entry_nav - 1.0,
            holding_days: (exit_date - holding.entry_date).num_days(),
            exit_reason,
        });
        self.trades.last()
    }

    pub fn open_holding(&self) -> Option<&OpenHolding> {
        self.open.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_parts(self) -> (Vec<Trade>, Option<OpenHolding>) {
        (self.trades, self.open)
    }
}
