//! Run configuration — the TOML-backed `DmrConfig` tree.
//!
//! Every section falls back to its defaults when omitted, so an empty file is
//! a valid configuration. Component configs (`CostModel`, `GateThresholds`,
//! `WalkForwardParams`, `ForestParams`) are derived from it and handed to
//! constructors; nothing reads configuration globally.

use crate::fitness::FitnessMetric;
use crate::result::RunId;
use dmrlab_core::classifier::ForestParams;
use dmrlab_core::engine::{CostModel, Simulator};
use dmrlab_core::features::StandardFeature;
use dmrlab_core::gate::GateThresholds;
use dmrlab_core::walk_forward::WalkForwardParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmrConfig {
    pub trading: TradingConfig,
    pub strategy: StrategyConfig,
    pub ml: MlConfig,
    pub assets: AssetsConfig,
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Charged once per leg; an A↔B switch pays it twice.
    pub commission_rate: f64,
    /// Annual rate; cash earns rate / 252 per day.
    pub risk_free_rate: f64,
    /// Optimizer cells must keep max drawdown strictly above this.
    pub max_drawdown_limit: f64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            commission_rate: 0.0003,
            risk_free_rate: 0.03,
            max_drawdown_limit: -0.20,
        }
    }
}

/// Half-open integer range `start..stop` advancing by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl RangeSpec {
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        Self { start, stop, step }
    }

    pub fn values(&self) -> Vec<usize> {
        if self.step == 0 {
            return Vec::new();
        }
        (self.start..self.stop).step_by(self.step).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub momentum_range: RangeSpec,
    pub ma_range: RangeSpec,
    pub default_momentum_window: usize,
    pub default_ma_window: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            momentum_range: RangeSpec::new(15, 31, 5),
            ma_range: RangeSpec::new(10, 21, 2),
            default_momentum_window: 20,
            default_ma_window: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    pub risk_trigger_threshold: f64,
    pub risk_release_threshold: f64,
    pub train_window: usize,
    pub horizon: usize,
    pub step: usize,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub random_state: u64,
    pub risk_return_threshold: f64,
    pub min_train_rows: usize,
    pub smoothing_span: usize,
    pub features: Vec<String>,
}

impl Default for MlConfig {
    fn default() -> Self {
        let wf = WalkForwardParams::default();
        let forest = ForestParams::default();
        let gate = GateThresholds::default();
        Self {
            risk_trigger_threshold: gate.trigger(),
            risk_release_threshold: gate.release(),
            train_window: wf.train_window,
            horizon: wf.horizon,
            step: wf.step,
            n_estimators: forest.n_estimators,
            max_depth: forest.max_depth,
            min_samples_leaf: forest.min_samples_leaf,
            random_state: forest.seed,
            risk_return_threshold: wf.risk_return_threshold,
            min_train_rows: wf.min_train_rows,
            smoothing_span: wf.smoothing_span,
            features: wf.features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSpec {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub a: AssetSpec,
    pub b: AssetSpec,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            a: AssetSpec {
                code: "000300.SH".into(),
                name: "CSI 300".into(),
            },
            b: AssetSpec {
                code: "000852.SH".into(),
                name: "CSI 1000".into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub metric: FitnessMetric,
    /// Index into the aligned dates where the buy-and-hold hurdle starts.
    pub benchmark_offset: usize,
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            metric: FitnessMetric::Sharpe,
            benchmark_offset: 30,
            parallel: true,
        }
    }
}

/// Reject empty window lists and zero windows before any simulation runs.
pub fn check_windows(name: &str, windows: &[usize]) -> Result<(), ConfigError> {
    if windows.is_empty() {
        return Err(ConfigError::Invalid(format!("{name} windows are empty")));
    }
    if let Some(&w) = windows.iter().find(|&&w| w == 0) {
        return Err(ConfigError::Invalid(format!("{name} window must be >= 1, got {w}")));
    }
    Ok(())
}

impl DmrConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let t = &self.trading;
        if !(t.commission_rate >= 0.0 && t.commission_rate < 1.0) {
            return invalid(format!(
                "commission_rate must be in [0, 1), got {}",
                t.commission_rate
            ));
        }
        if !t.risk_free_rate.is_finite() || t.risk_free_rate < 0.0 {
            return invalid(format!(
                "risk_free_rate must be non-negative, got {}",
                t.risk_free_rate
            ));
        }
        if !(t.max_drawdown_limit <= 0.0 && t.max_drawdown_limit >= -1.0) {
            return invalid(format!(
                "max_drawdown_limit must be in [-1, 0], got {}",
                t.max_drawdown_limit
            ));
        }

        let s = &self.strategy;
        for (name, range) in [("momentum_range", s.momentum_range), ("ma_range", s.ma_range)] {
            if range.step == 0 {
                return invalid(format!("{name}.step must be >= 1"));
            }
            if range.start == 0 {
                return invalid(format!("{name}.start must be >= 1"));
            }
            if range.values().is_empty() {
                return invalid(format!(
                    "{name} is empty: start={} stop={}",
                    range.start, range.stop
                ));
            }
        }
        if s.default_momentum_window == 0 || s.default_ma_window == 0 {
            return invalid("default windows must be >= 1".into());
        }

        self.gate_thresholds()?;
        self.walk_forward_params()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        for name in &self.ml.features {
            StandardFeature::from_name(name).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        if self.ml.n_estimators == 0 || self.ml.max_depth == 0 || self.ml.min_samples_leaf == 0 {
            return invalid("n_estimators, max_depth and min_samples_leaf must be >= 1".into());
        }
        Ok(())
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.trading.commission_rate, self.trading.risk_free_rate)
    }

    pub fn gate_thresholds(&self) -> Result<GateThresholds, ConfigError> {
        GateThresholds::new(self.ml.risk_trigger_threshold, self.ml.risk_release_threshold)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn simulator(&self) -> Result<Simulator, ConfigError> {
        Ok(Simulator::new(self.cost_model(), self.gate_thresholds()?))
    }

    pub fn walk_forward_params(&self) -> WalkForwardParams {
        let ml = &self.ml;
        WalkForwardParams {
            train_window: ml.train_window,
            horizon: ml.horizon,
            step: ml.step,
            min_train_rows: ml.min_train_rows,
            smoothing_span: ml.smoothing_span,
            risk_return_threshold: ml.risk_return_threshold,
            features: ml.features.clone(),
        }
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_estimators: self.ml.n_estimators,
            max_depth: self.ml.max_depth,
            min_samples_leaf: self.ml.min_samples_leaf,
            seed: self.ml.random_state,
            balanced: true,
        }
    }

    /// Deterministic hash of the whole configuration.
    ///
    /// Two runs with identical configs share a RunId and an artifact directory.
    pub fn run_id(&self) -> RunId {
        // serde_json keeps struct field order, so the encoding is canonical
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
