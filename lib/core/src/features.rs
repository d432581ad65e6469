//! Feature vectors
//!
//! Each item becomes `[tfidf(text blob) | binary_weight * minmax(flags)]`.
//! The text block is always `max_features` wide and the binary block always
//! [`BINARY_COLUMNS`] wide, so every vector has the same dimension.

use crate::catalog::{Catalog, BINARY_COLUMNS};
use crate::tfidf::TfidfVectorizer;
use crate::Vector;

/// Per-column min-max scaling into [0, 1]. A constant column maps to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    min: Vec<f32>,
    range: Vec<f32>,
}

impl MinMaxScaler {
    pub fn fit(rows: &[Vec<f32>]) -> Self {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut min = vec![f32::INFINITY; width];
        let mut max = vec![f32::NEG_INFINITY; width];
        for row in rows {
            for (col, &value) in row.iter().enumerate() {
                min[col] = min[col].min(value);
                max[col] = max[col].max(value);
            }
        }
        let range = min
            .iter()
            .zip(max.iter())
            .map(|(lo, hi)| if hi > lo { hi - lo } else { 1.0 })
            .collect();
        Self { min, range }
    }

    pub fn transform(&self, row: &[f32]) -> Vec<f32> {
        row.iter()
            .zip(self.min.iter().zip(self.range.iter()))
            .map(|(value, (lo, range))| (value - lo) / range)
            .collect()
    }
}

/// Build one feature vector per catalog item, in catalog order
pub fn build_feature_vectors(
    catalog: &Catalog,
    vectorizer: &TfidfVectorizer,
    binary_weight: f32,
) -> Vec<Vector> {
    let binary_rows: Vec<Vec<f32>> = catalog
        .iter()
        .map(|tool| tool.flags.as_f32().to_vec())
        .collect();
    let scaler = MinMaxScaler::fit(&binary_rows);

    catalog
        .iter()
        .zip(binary_rows.iter())
        .map(|(tool, flags)| {
            let text = vectorizer.transform(&tool.text_blob());
            let binary = &Vector::new(scaler.transform(flags)) * binary_weight;
            Vector::concat(&[&text, binary.as_slice()])
        })
        .collect()
}

/// Dimension of the feature vectors produced for a vectorizer
#[inline]
pub fn feature_dim(vectorizer: &TfidfVectorizer) -> usize {
    vectorizer.dim() + BINARY_COLUMNS.len()
}
