//! Data loader — reads daily bars from CSV and aligns the two assets.
//!
//! Expected header: `date,close,pct_chg,volume`. Dates may be `YYYY-MM-DD`
//! or `YYYYMMDD`. A blank `pct_chg` is derived from consecutive closes after
//! sorting; rows with a blank close are dropped.

use chrono::NaiveDate;
use dmrlab_core::data::{AlignError, AlignedPair};
use dmrlab_core::domain::Bar;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: unrecognized date '{value}'")]
    BadDate { line: u64, value: String },
    #[error("duplicate date {0}")]
    DuplicateDate(NaiveDate),
    #[error("no usable rows in {0}")]
    Empty(String),
    #[error("alignment failed: {0}")]
    Align(#[from] AlignError),
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    close: Option<f64>,
    pct_chg: Option<f64>,
    volume: Option<f64>,
}

/// Load and sort the bars of one CSV file.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let bars = read_bars(file)?;
    if bars.is_empty() {
        return Err(LoadError::Empty(path.display().to_string()));
    }
    tracing::debug!(path = %path.display(), rows = bars.len(), "loaded bars");
    Ok(bars)
}

/// Parse bars from any CSV source.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows: Vec<(NaiveDate, f64, Option<f64>, f64)> = Vec::new();
    for (idx, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        // header is line 1
        let line = idx as u64 + 2;
        let date = parse_date(&row.date).ok_or_else(|| LoadError::BadDate {
            line,
            value: row.date.clone(),
        })?;
        let Some(close) = row.close else {
            tracing::warn!(line, %date, "dropping row without close");
            continue;
        };
        rows.push((date, close, row.pct_chg, row.volume.unwrap_or(0.0)));
    }

    rows.sort_by_key(|r| r.0);
    if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(LoadError::DuplicateDate(w[0].0));
    }

    let mut bars = Vec::with_capacity(rows.len());
    let mut prev_close: Option<f64> = None;
    for (date, close, pct_chg, volume) in rows {
        let pct_chg = pct_chg.unwrap_or_else(|| match prev_close {
            Some(prev) if prev > 0.0 => (close / prev - 1.0) * 100.0,
            _ => 0.0,
        });
        bars.push(Bar::new(date, close, pct_chg, volume));
        prev_close = Some(close);
    }
    Ok(bars)
}

/// Load both assets and align them on their common dates.
pub fn load_pair(path_a: &Path, path_b: &Path) -> Result<AlignedPair, LoadError> {
    let a = load_bars(path_a)?;
    let b = load_bars(path_b)?;
    let pair = AlignedPair::align(&a, &b)?;
    tracing::info!(
        dates = pair.len(),
        first = ?pair.first_date(),
        last = ?pair.last_date(),
        "aligned price pair"
    );
    Ok(pair)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
}
