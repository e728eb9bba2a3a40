//! Feature engineering for the risk classifier.
//!
//! A `FeatureFrame` is an immutable, date-indexed set of named columns. The
//! `FeaturePipeline` builds one from raw bars by applying an ordered list of
//! `FeatureTransform`s, each of which reads existing columns and contributes
//! exactly one new column. Missing values are NaN throughout.

pub mod frame;
pub mod label;
pub mod pipeline;

pub use frame::FeatureFrame;
pub use label::risk_labels;
pub use pipeline::{FeatureError, FeaturePipeline, FeatureTransform, StandardFeature};
