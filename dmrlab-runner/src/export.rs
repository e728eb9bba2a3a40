//! Artifact export — manifest JSON plus CSV equity curve, trade tape and grid.
//!
//! Layout of one saved strategy run:
//! - `manifest.json`: strategy, parameters, date range, metrics
//! - `equity.csv`: `date,nav`
//! - `trades.csv`: one row per closed trade

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dmrlab_core::domain::{Position, Trade};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::PerformanceMetrics;
use crate::optimizer::GridRow;
use crate::result::{BacktestResult, EquityPoint, RunId, StrategyParameters};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Summary persisted as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: RunId,
    pub strategy: String,
    pub parameters: StrategyParameters,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub final_position: Position,
    pub metrics: PerformanceMetrics,
}

impl Manifest {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            strategy: result.strategy.clone(),
            parameters: result.parameters,
            start_date: result.start_date(),
            end_date: result.end_date(),
            final_position: result.final_position,
            metrics: result.metrics.clone(),
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: asset, entry_date, exit_date, entry_nav, exit_nav, return_pct,
/// holding_days, exit_reason
pub fn export_trades_csv(trades: &[Trade]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "asset",
        "entry_date",
        "exit_date",
        "entry_nav",
        "exit_nav",
        "return_pct",
        "holding_days",
        "exit_reason",
    ])?;
    for t in trades {
        wtr.write_record([
            &t.asset.to_string(),
            &t.entry_date.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.entry_nav),
            &format!("{:.6}", t.exit_nav),
            &format!("{:.6}", t.return_pct),
            &t.holding_days.to_string(),
            &t.exit_reason.to_string(),
        ])?;
    }
    finish(wtr)
}

pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "nav"])?;
    for p in equity_curve {
        wtr.write_record([&p.date.to_string(), &format!("{:.6}", p.nav)])?;
    }
    finish(wtr)
}

/// Optimizer table; metric columns are empty for cells with no data.
pub fn export_grid_csv(rows: &[GridRow]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let data = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(data)?)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save one strategy run under `dir/<strategy>/`. Returns that directory.
pub fn save_artifacts(result: &BacktestResult, dir: &Path) -> Result<PathBuf, ExportError> {
    let run_dir = dir.join(slug(&result.strategy));
    create_dir(&run_dir)?;

    let manifest = serde_json::to_string_pretty(&Manifest::from_result(result))?;
    write(&run_dir.join("manifest.json"), &manifest)?;
    write(&run_dir.join("equity.csv"), &export_equity_csv(&result.equity_curve)?)?;
    write(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;

    tracing::info!(strategy = %result.strategy, dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Save the optimizer table as `dir/grid.csv`.
pub fn save_grid(rows: &[GridRow], dir: &Path) -> Result<PathBuf, ExportError> {
    create_dir(dir)?;
    let path = dir.join("grid.csv");
    write(&path, &export_grid_csv(rows)?)?;
    Ok(path)
}

/// Save any serializable value as pretty JSON at `path`.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    write(path, &serde_json::to_string_pretty(value)?)
}

/// Read a manifest back from a run directory.
pub fn load_manifest(run_dir: &Path) -> Result<Manifest, ExportError> {
    let path = run_dir.join("manifest.json");
    let json = std::fs::read_to_string(&path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn create_dir(dir: &Path) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    })
}

fn write(path: &Path, content: &str) -> Result<(), ExportError> {
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}
