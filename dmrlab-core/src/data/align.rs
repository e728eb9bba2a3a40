//! Two-asset time alignment.
//!
//! The rotation needs both legs priced on the same day, so the common timeline
//! is the intersection of the two series' dates. Dates present on only one
//! side are dropped rather than filled.

use crate::domain::{Asset, Bar, BarError};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AlignError {
    #[error("asset {asset}: dates must be strictly increasing ({prev} then {next})")]
    Unsorted {
        asset: Asset,
        prev: NaiveDate,
        next: NaiveDate,
    },
    #[error("asset {asset}: {source}")]
    InvalidBar {
        asset: Asset,
        #[source]
        source: BarError,
    },
}

/// Bars for asset A and asset B on a common, strictly increasing calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    dates: Vec<NaiveDate>,
    a: Vec<Bar>,
    b: Vec<Bar>,
}

impl AlignedPair {
    /// Intersect two bar series on their dates.
    ///
    /// Each input must already be strictly increasing by date; bars with a
    /// non-positive or non-finite close are rejected.
    pub fn align(a: &[Bar], b: &[Bar]) -> Result<Self, AlignError> {
        check_series(Asset::A, a)?;
        check_series(Asset::B, b)?;

        let b_by_date: HashMap<NaiveDate, &Bar> = b.iter().map(|bar| (bar.date, bar)).collect();

        let mut dates = Vec::new();
        let mut aligned_a = Vec::new();
        let mut aligned_b = Vec::new();
        for bar_a in a {
            if let Some(bar_b) = b_by_date.get(&bar_a.date) {
                dates.push(bar_a.date);
                aligned_a.push(*bar_a);
                aligned_b.push(**bar_b);
            }
        }

        let dropped = (a.len() - dates.len()) + (b.len() - dates.len());
        if dropped > 0 {
            tracing::warn!(dropped, common = dates.len(), "dropped unmatched dates during alignment");
        }

        Ok(Self {
            dates,
            a: aligned_a,
            b: aligned_b,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn bars(&self, asset: Asset) -> &[Bar] {
        match asset {
            Asset::A => &self.a,
            Asset::B => &self.b,
        }
    }

    pub fn closes(&self, asset: Asset) -> Vec<f64> {
        self.bars(asset).iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Index of `date` on the common calendar.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}

fn check_series(asset: Asset, bars: &[Bar]) -> Result<(), AlignError> {
    for bar in bars {
        bar.validate()
            .map_err(|source| AlignError::InvalidBar { asset, source })?;
    }
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(AlignError::Unsorted {
                asset,
                prev: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    Ok(())
}
