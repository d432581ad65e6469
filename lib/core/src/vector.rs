use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A dense feature vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    /// Concatenate blocks into one vector
    #[must_use]
    pub fn concat(blocks: &[&[f32]]) -> Self {
        let dim = blocks.iter().map(|b| b.len()).sum();
        let mut data = Vec::with_capacity(dim);
        for block in blocks {
            data.extend_from_slice(block);
        }
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        dot(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        dot(&self.data, &self.data).sqrt()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }

    /// Cosine similarity, clamped to [-1, 1]; 0 when either side is a zero
    /// vector or the dimensions differ
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        cosine(&self.data, &other.data)
    }
}

/// Plain dot product with two accumulators. Summation order only depends on
/// the index, so `dot(a, b) == dot(b, a)` bit for bit.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut sum1 = 0.0f32;
    let mut sum2 = 0.0f32;
    let chunks = a.len() / 2;
    for i in 0..chunks {
        sum1 += a[2 * i] * b[2 * i];
        sum2 += a[2 * i + 1] * b[2 * i + 1];
    }
    if a.len() % 2 == 1 {
        sum1 += a[a.len() - 1] * b[b.len() - 1];
    }
    sum1 + sum2
}

#[inline]
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = dot(a, a).sqrt();
    let norm_b = dot(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

impl Mul<f32> for &Vector {
    type Output = Vector;

    fn mul(self, scalar: f32) -> Vector {
        Vector::new(self.data.iter().map(|x| x * scalar).collect())
    }
}
