//! Pairwise cosine similarity matrix over feature vectors.

use crate::vector::dot;
use crate::{Error, Result, Vector};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Square, symmetric, row-major `n x n` matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    size: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Compute cosine similarity between every pair of vectors
    ///
    /// Rows are computed in parallel. Entries against a zero vector are 0,
    /// the diagonal is exactly 1 for every nonzero vector.
    pub fn compute(vectors: &[Vector]) -> Self {
        let size = vectors.len();
        let norms: Vec<f32> = vectors.iter().map(Vector::norm).collect();

        let rows: Vec<Vec<f32>> = (0..size)
            .into_par_iter()
            .map(|i| {
                (0..size)
                    .map(|j| {
                        if norms[i] == 0.0 || norms[j] == 0.0 {
                            0.0
                        } else if i == j {
                            1.0
                        } else {
                            let d = dot(vectors[i].as_slice(), vectors[j].as_slice());
                            (d / (norms[i] * norms[j])).clamp(-1.0, 1.0)
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            size,
            data: rows.into_iter().flatten().collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.size + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.len() != self.size * self.size {
            return Err(Error::CorruptArtifact(format!(
                "similarity matrix has {} entries, expected {}",
                self.data.len(),
                self.size * self.size
            )));
        }
        Ok(())
    }
}
