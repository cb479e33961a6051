//! Column transform shared by the three pipelines.
//!
//! Numeric columns pass through unchanged; categorical columns are expanded
//! with a one-hot encoder whose categories are frozen at fit time. A value
//! never seen during fitting encodes to all zeros instead of failing.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{CultureFitError, Result};
use crate::schema::{FeatureRecord, CATEGORICAL_FEATURES, NUMERIC_FEATURES};

/// One-hot encoder for a single categorical column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted categories observed at fit time.
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let categories: BTreeSet<&str> = values.into_iter().collect();
        OneHotEncoder {
            column: column.to_string(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Write the indicator block for `value` into `out`, which must be
    /// `width()` long and zeroed.
    pub fn encode_into(&self, value: &str, out: &mut [f64]) {
        if let Ok(pos) = self.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            out[pos] = 1.0;
        }
    }

    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.categories
            .iter()
            .map(move |c| format!("{}_{}", self.column, c))
    }
}

/// Fitted column transform: 9 pass-through columns followed by the one-hot
/// blocks of each categorical column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub encoders: Vec<OneHotEncoder>,
}

impl Preprocessor {
    /// Fit the categorical encoders on a training partition.
    pub fn fit(records: &[&FeatureRecord]) -> Result<Self> {
        if records.is_empty() {
            return Err(CultureFitError::EmptyDataset);
        }

        let encoders = CATEGORICAL_FEATURES
            .iter()
            .enumerate()
            .map(|(i, column)| {
                OneHotEncoder::fit(column, records.iter().map(|r| r.categorical_values()[i]))
            })
            .collect();

        Ok(Preprocessor { encoders })
    }

    /// Width of the transformed vector.
    pub fn n_features(&self) -> usize {
        NUMERIC_FEATURES.len() + self.encoders.iter().map(OneHotEncoder::width).sum::<usize>()
    }

    /// Output column names in transform order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        for encoder in &self.encoders {
            names.extend(encoder.feature_names());
        }
        names
    }

    /// Transform a single record into a vector of `n_features()` values.
    pub fn transform_one(&self, record: &FeatureRecord) -> Vec<f64> {
        let mut row = vec![0.0; self.n_features()];
        self.write_row(record, &mut row);
        row
    }

    /// Transform records into a feature matrix (rows are samples).
    pub fn transform(&self, records: &[&FeatureRecord]) -> Array2<f64> {
        let width = self.n_features();
        let mut x = Array2::<f64>::zeros((records.len(), width));
        for (i, record) in records.iter().enumerate() {
            let mut row = x.row_mut(i);
            // Rows of a freshly allocated standard-layout array are contiguous.
            if let Some(slice) = row.as_slice_mut() {
                self.write_row(record, slice);
            } else {
                let values = self.transform_one(record);
                for (dst, v) in row.iter_mut().zip(values) {
                    *dst = v;
                }
            }
        }
        x
    }

    fn write_row(&self, record: &FeatureRecord, out: &mut [f64]) {
        let numeric = record.numeric_values();
        out[..numeric.len()].copy_from_slice(&numeric);

        let mut offset = numeric.len();
        for (encoder, value) in self.encoders.iter().zip(record.categorical_values()) {
            let width = encoder.width();
            encoder.encode_into(value, &mut out[offset..offset + width]);
            offset += width;
        }
    }
}
