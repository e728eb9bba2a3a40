//! FeaturePipeline — ordered composition of column transforms.

use super::frame::FeatureFrame;
use crate::domain::Bar;
use crate::indicators::{lag, rolling_corr, Indicator, RollingStd, Sma};
use thiserror::Error;

/// Base columns present in every frame built from bars.
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";
pub const RET: &str = "ret";

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("feature {feature} needs column {column}, which is not in the frame")]
    MissingColumn { feature: String, column: String },
}

/// A pure transform contributing one named column.
pub trait FeatureTransform: Send + Sync {
    fn name(&self) -> &str;

    /// Compute the new column from columns already present in `frame`.
    fn apply(&self, frame: &FeatureFrame) -> Result<Vec<f64>, FeatureError>;
}

/// The built-in technical features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFeature {
    /// std(ret, 5) / std(ret, 20)
    VolRatio,
    /// close / SMA(close, 20) - 1
    MaBias,
    /// volume / SMA(volume, 20)
    VolFactor,
    /// std(volume, 20) / SMA(volume, 20)
    VolStd,
    /// corr(close, volume, 20)
    PvCorr,
    /// corr(ret, ret lagged 1, 20)
    RetAutocorr,
    /// std(ret, 5) / std(ret, 5) five days earlier
    VolRegime,
}

impl StandardFeature {
    pub const ALL: [StandardFeature; 7] = [
        StandardFeature::VolRatio,
        StandardFeature::MaBias,
        StandardFeature::VolFactor,
        StandardFeature::VolStd,
        StandardFeature::PvCorr,
        StandardFeature::RetAutocorr,
        StandardFeature::VolRegime,
    ];

    pub fn from_name(name: &str) -> Result<Self, FeatureError> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == name)
            .ok_or_else(|| FeatureError::UnknownFeature(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StandardFeature::VolRatio => "vol_ratio",
            StandardFeature::MaBias => "ma_bias",
            StandardFeature::VolFactor => "vol_factor",
            StandardFeature::VolStd => "vol_std",
            StandardFeature::PvCorr => "pv_corr",
            StandardFeature::RetAutocorr => "ret_autocorr",
            StandardFeature::VolRegime => "vol_regime",
        }
    }
}

const LONG: usize = 20;
const SHORT: usize = 5;

impl FeatureTransform for StandardFeature {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn apply(&self, frame: &FeatureFrame) -> Result<Vec<f64>, FeatureError> {
        let column = |name: &str| {
            frame.column(name).ok_or_else(|| FeatureError::MissingColumn {
                feature: self.as_str().to_string(),
                column: name.to_string(),
            })
        };

        let values = match self {
            StandardFeature::VolRatio => {
                let ret = column(RET)?;
                ratio(
                    &RollingStd::new(SHORT).compute(ret),
                    &RollingStd::new(LONG).compute(ret),
                )
            }
            StandardFeature::MaBias => {
                let close = column(CLOSE)?;
                ratio(close, &Sma::new(LONG).compute(close))
                    .into_iter()
                    .map(|r| r - 1.0)
                    .collect()
            }
            StandardFeature::VolFactor => {
                let volume = column(VOLUME)?;
                ratio(volume, &Sma::new(LONG).compute(volume))
            }
            StandardFeature::VolStd => {
                let volume = column(VOLUME)?;
                ratio(
                    &RollingStd::new(LONG).compute(volume),
                    &Sma::new(LONG).compute(volume),
                )
            }
            StandardFeature::PvCorr => rolling_corr(column(CLOSE)?, column(VOLUME)?, LONG),
            StandardFeature::RetAutocorr => {
                let ret = column(RET)?;
                rolling_corr(ret, &lag(ret, 1), LONG)
            }
            StandardFeature::VolRegime => {
                let short_vol = RollingStd::new(SHORT).compute(column(RET)?);
                ratio(&short_vol, &lag(&short_vol, SHORT))
            }
        };
        Ok(values)
    }
}

/// Element-wise division; NaN where the quotient is not finite.
fn ratio(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter()
        .zip(den)
        .map(|(n, d)| {
            let q = n / d;
            if q.is_finite() {
                q
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Ordered list of transforms applied on top of the base columns.
pub struct FeaturePipeline {
    transforms: Vec<Box<dyn FeatureTransform>>,
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// All seven built-in features.
    pub fn standard() -> Self {
        StandardFeature::ALL
            .into_iter()
            .fold(Self::new(), |pipeline, feature| pipeline.then(feature))
    }

    /// Pipeline computing exactly the named built-in features, in order.
    pub fn for_features<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, FeatureError> {
        let mut pipeline = Self::new();
        for name in names {
            pipeline = pipeline.then(StandardFeature::from_name(name)?);
        }
        Ok(pipeline)
    }

    pub fn then(mut self, transform: impl FeatureTransform + 'static) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.transforms.iter().map(|t| t.name().to_string()).collect()
    }

    /// Build the base frame from bars, then apply every transform in order.
    pub fn run(&self, bars: &[Bar]) -> Result<FeatureFrame, FeatureError> {
        let base = FeatureFrame::new(bars.iter().map(|b| b.date).collect())
            .with_column(CLOSE, bars.iter().map(|b| b.close).collect())
            .with_column(VOLUME, bars.iter().map(|b| b.volume).collect())
            .with_column(RET, bars.iter().map(Bar::daily_return).collect());

        self.transforms.iter().try_fold(base, |frame, transform| {
            let values = transform.apply(&frame)?;
            Ok(frame.with_column(transform.name(), values))
        })
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePipeline")
            .field("transforms", &self.names())
            .finish()
    }
}
