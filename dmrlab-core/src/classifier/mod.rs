//! Binary probabilistic classifiers.
//!
//! The walk-forward trainer only talks to `Classifier` trait objects and
//! obtains a fresh one per retrain from a `ClassifierFactory`, so any model
//! with `fit` / `predict_proba` can stand in for the random forest.

pub mod forest;
pub mod tree;

pub use forest::{ForestParams, RandomForest};
pub use tree::{DecisionTree, TreeParams};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifierError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("{rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },
    #[error("row {row} has {got} features, expected {expected}")]
    FeatureCount {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("row {row} feature {feature} is not finite")]
    NonFinite { row: usize, feature: usize },
    #[error("training labels contain a single class")]
    SingleClass,
    #[error("model has not been fitted")]
    NotFitted,
}

/// A binary classifier producing class-1 probabilities.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Fit on row-major features `x` and labels `y`. Refitting replaces the
    /// previous model entirely.
    fn fit(&mut self, x: &[Vec<f64>], y: &[bool]) -> Result<(), ClassifierError>;

    /// Probability of class 1 for every row of `x`.
    fn predict_proba(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ClassifierError>;

    /// Per-feature importance, summing to 1 (or all zero if no split was made).
    fn feature_importances(&self) -> Vec<f64>;
}

/// Creates a fresh, unfitted classifier with fixed hyperparameters.
pub trait ClassifierFactory: Send + Sync {
    fn create(&self) -> Box<dyn Classifier>;
}

/// Shape and value checks shared by implementations.
pub(crate) fn validate_training_set(x: &[Vec<f64>], y: &[bool]) -> Result<usize, ClassifierError> {
    if x.is_empty() {
        return Err(ClassifierError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(ClassifierError::LengthMismatch {
            rows: x.len(),
            labels: y.len(),
        });
    }
    let n_features = x[0].len();
    for (row, values) in x.iter().enumerate() {
        if values.len() != n_features {
            return Err(ClassifierError::FeatureCount {
                row,
                expected: n_features,
                got: values.len(),
            });
        }
        if let Some(feature) = values.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::NonFinite { row, feature });
        }
    }
    let positives = y.iter().filter(|&&l| l).count();
    if positives == 0 || positives == y.len() {
        return Err(ClassifierError::SingleClass);
    }
    Ok(n_features)
}
