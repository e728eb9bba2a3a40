//! Purged walk-forward risk classifier.
//!
//! Retrains a fresh classifier every `step` dates on the trailing
//! `train_window` rows, leaving out the last `horizon` rows before the
//! forecast block: their labels look into the block being predicted. The
//! raw class-1 probabilities are then smoothed with a span-based EWM, and
//! that smoothed series is what the gate consumes.

use crate::classifier::{Classifier, ClassifierError, ClassifierFactory};
use crate::domain::Bar;
use crate::features::pipeline::RET;
use crate::features::{risk_labels, FeatureError, FeatureFrame, FeaturePipeline};
use crate::indicators::{Ewm, Indicator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("invalid walk-forward parameters: {0}")]
    InvalidParams(String),
    #[error("{labels} labels for {rows} feature rows")]
    LabelLength { rows: usize, labels: usize },
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("retrain at index {index} failed: {source}")]
    Classifier {
        index: usize,
        #[source]
        source: ClassifierError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardParams {
    pub train_window: usize,
    pub horizon: usize,
    pub step: usize,
    /// Retrains with fewer complete rows than this are skipped.
    pub min_train_rows: usize,
    pub smoothing_span: usize,
    /// A date is labeled risky when any of the next `horizon` daily returns
    /// falls below this.
    pub risk_return_threshold: f64,
    pub features: Vec<String>,
}

impl Default for WalkForwardParams {
    fn default() -> Self {
        Self {
            train_window: 252,
            horizon: 5,
            step: 20,
            min_train_rows: 100,
            smoothing_span: 5,
            risk_return_threshold: -0.025,
            features: vec![
                "vol_ratio".to_string(),
                "ma_bias".to_string(),
                "vol_factor".to_string(),
            ],
        }
    }
}

impl WalkForwardParams {
    pub fn validate(&self) -> Result<(), WalkForwardError> {
        let invalid = |msg: String| Err(WalkForwardError::InvalidParams(msg));
        if self.horizon == 0 {
            return invalid("horizon must be >= 1".into());
        }
        if self.train_window <= self.horizon {
            return invalid(format!(
                "train_window ({}) must exceed horizon ({})",
                self.train_window, self.horizon
            ));
        }
        if self.step == 0 {
            return invalid("step must be >= 1".into());
        }
        if self.smoothing_span == 0 {
            return invalid("smoothing_span must be >= 1".into());
        }
        if self.features.is_empty() {
            return invalid("at least one feature is required".into());
        }
        Ok(())
    }

    /// Retrain indices: `train_window + horizon`, advancing by `step`, while
    /// a full `horizon` of dates remains after the index.
    pub fn retrain_points(&self, len: usize) -> impl Iterator<Item = usize> {
        let start = self.train_window + self.horizon;
        let end = len.saturating_sub(self.horizon);
        (start..end).step_by(self.step.max(1))
    }
}

/// Smoothed risk probability per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSeries(BTreeMap<NaiveDate, f64>);

impl RiskSeries {
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.0.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.0.iter().map(|(d, p)| (*d, *p))
    }
}

impl FromIterator<(NaiveDate, f64)> for RiskSeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    InsufficientRows { rows: usize, required: usize },
    SingleClass,
}

/// One fitted retrain block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainRecord {
    /// First row of the forecast block.
    pub index: usize,
    pub date: NaiveDate,
    /// Candidate training rows are `train_start..train_end`.
    pub train_start: usize,
    pub train_end: usize,
    pub rows_used: usize,
    pub importances: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRetrain {
    pub index: usize,
    pub date: NaiveDate,
    pub reason: SkipReason,
}

/// Everything a walk-forward pass produced.
#[derive(Debug)]
pub struct RiskForecast {
    pub dates: Vec<NaiveDate>,
    pub raw: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub retrains: Vec<RetrainRecord>,
    pub skipped: Vec<SkippedRetrain>,
    /// Mean importance per feature across retrains, highest first.
    pub feature_importance: Vec<(String, f64)>,
    pub last_model: Option<Box<dyn Classifier>>,
}

impl RiskForecast {
    pub fn series(&self) -> RiskSeries {
        self.dates
            .iter()
            .copied()
            .zip(self.smoothed.iter().copied())
            .collect()
    }
}

pub struct RiskClassifier {
    params: WalkForwardParams,
    factory: Box<dyn ClassifierFactory>,
}

impl RiskClassifier {
    pub fn new(
        params: WalkForwardParams,
        factory: impl ClassifierFactory + 'static,
    ) -> Result<Self, WalkForwardError> {
        params.validate()?;
        Ok(Self {
            params,
            factory: Box::new(factory),
        })
    }

    pub fn params(&self) -> &WalkForwardParams {
        &self.params
    }

    /// Build the configured features and risk labels from one asset's bars,
    /// then run the walk-forward pass.
    pub fn fit_predict_bars(&self, bars: &[Bar]) -> Result<RiskForecast, WalkForwardError> {
        let pipeline = FeaturePipeline::for_features(self.params.features.iter().map(String::as_str))?;
        let frame = pipeline.run(bars)?;
        let returns = frame.column(RET).unwrap_or_default();
        let labels = risk_labels(
            returns,
            self.params.horizon,
            self.params.risk_return_threshold,
        );
        self.fit_predict(&frame, &labels)
    }

    /// Walk-forward training and inference over a prepared frame.
    ///
    /// Rows with any missing configured feature or no label are dropped from
    /// training; missing features are read as 0 at inference. Blocks whose
    /// retrain is skipped keep a raw probability of 0.
    pub fn fit_predict(
        &self,
        frame: &FeatureFrame,
        labels: &[Option<bool>],
    ) -> Result<RiskForecast, WalkForwardError> {
        let n = frame.len();
        if labels.len() != n {
            return Err(WalkForwardError::LabelLength {
                rows: n,
                labels: labels.len(),
            });
        }
        for name in &self.params.features {
            if frame.column(name).is_none() {
                return Err(FeatureError::MissingColumn {
                    feature: name.clone(),
                    column: name.clone(),
                }
                .into());
            }
        }

        let features = &self.params.features;
        let horizon = self.params.horizon;
        let mut raw = vec![0.0; n];
        let mut retrains = Vec::new();
        let mut skipped = Vec::new();
        let mut last_model: Option<Box<dyn Classifier>> = None;

        for t in self.params.retrain_points(n) {
            let date = frame.dates()[t];
            let train_start = t - self.params.train_window;
            let train_end = t - horizon;

            let mut x = Vec::new();
            let mut y = Vec::new();
            for i in train_start..train_end {
                let row = frame.row(i, features);
                if let (Some(label), true) = (labels[i], row.iter().all(|v| v.is_finite())) {
                    x.push(row);
                    y.push(label);
                }
            }

            let skip = if x.len() < self.params.min_train_rows {
                Some(SkipReason::InsufficientRows {
                    rows: x.len(),
                    required: self.params.min_train_rows,
                })
            } else if y.iter().all(|&l| l) || y.iter().all(|&l| !l) {
                Some(SkipReason::SingleClass)
            } else {
                None
            };
            if let Some(reason) = skip {
                tracing::debug!(index = t, %date, ?reason, "skipping retrain");
                skipped.push(SkippedRetrain {
                    index: t,
                    date,
                    reason,
                });
                continue;
            }

            let mut model = self.factory.create();
            model
                .fit(&x, &y)
                .map_err(|source| WalkForwardError::Classifier { index: t, source })?;

            let block_end = (t + self.params.step).min(n);
            let block: Vec<Vec<f64>> = (t..block_end)
                .map(|i| {
                    frame
                        .row(i, features)
                        .into_iter()
                        .map(|v| if v.is_finite() { v } else { 0.0 })
                        .collect()
                })
                .collect();
            let probs = model
                .predict_proba(&block)
                .map_err(|source| WalkForwardError::Classifier { index: t, source })?;
            raw[t..block_end].copy_from_slice(&probs);

            retrains.push(RetrainRecord {
                index: t,
                date,
                train_start,
                train_end,
                rows_used: x.len(),
                importances: features
                    .iter()
                    .cloned()
                    .zip(model.feature_importances())
                    .collect(),
            });
            last_model = Some(model);
        }

        let smoothed = Ewm::new(self.params.smoothing_span).compute(&raw);
        let feature_importance = mean_importance(features, &retrains);

        tracing::info!(
            retrains = retrains.len(),
            skipped = skipped.len(),
            rows = n,
            "walk-forward risk model complete"
        );

        Ok(RiskForecast {
            dates: frame.dates().to_vec(),
            raw,
            smoothed,
            retrains,
            skipped,
            feature_importance,
            last_model,
        })
    }
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClassifier")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

fn mean_importance(features: &[String], retrains: &[RetrainRecord]) -> Vec<(String, f64)> {
    if retrains.is_empty() {
        return Vec::new();
    }
    let mut totals = vec![0.0; features.len()];
    for record in retrains {
        for (total, (_, imp)) in totals.iter_mut().zip(&record.importances) {
            *total += imp;
        }
    }
    let count = retrains.len() as f64;
    let mut ranked: Vec<(String, f64)> = features
        .iter()
        .cloned()
        .zip(totals.into_iter().map(|t| t / count))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
