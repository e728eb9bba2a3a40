//! FeatureFrame — immutable named columns over a date axis.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Date-indexed numeric columns. Cloning is cheap; adding a column returns a
/// new frame and leaves the original untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    dates: Arc<[NaiveDate]>,
    columns: BTreeMap<String, Arc<[f64]>>,
}

impl FeatureFrame {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates: dates.into(),
            columns: BTreeMap::new(),
        }
    }

    /// Return a new frame with `name` set to `values`.
    ///
    /// Panics if `values` does not match the date axis; transforms always
    /// produce full-length columns.
    pub fn with_column(&self, name: impl Into<String>, values: Vec<f64>) -> Self {
        assert_eq!(
            values.len(),
            self.dates.len(),
            "column length must match the date axis"
        );
        let mut columns = self.columns.clone();
        columns.insert(name.into(), values.into());
        Self {
            dates: Arc::clone(&self.dates),
            columns,
        }
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

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|c| &c[..])
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Values of the named columns at row `index`, in the given order.
    /// Unknown columns read as NaN.
    pub fn row(&self, index: usize, names: &[String]) -> Vec<f64> {
        names
            .iter()
            .map(|name| {
                self.column(name)
                    .and_then(|c| c.get(index).copied())
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }
}
