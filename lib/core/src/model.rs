//! The fitted recommendation model: catalog snapshot, frozen vectorizer,
//! feature vectors and similarity matrix.

use crate::catalog::Catalog;
use crate::features::{build_feature_vectors, feature_dim};
use crate::similarity::SimilarityMatrix;
use crate::tfidf::TfidfVectorizer;
use crate::{Error, Result, Vector};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Build-time configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// TF-IDF vocabulary cap, which is also the text block width
    pub max_features: usize,
    /// Multiplier applied to the normalized binary block
    pub binary_weight: f32,
    /// Year used to derive years since release when the catalog has none
    pub reference_year: i32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_features: 100,
            binary_weight: 2.0,
            reference_year: 2025,
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(Error::InvalidConfig("max_features must be > 0".to_string()));
        }
        if !self.binary_weight.is_finite() || self.binary_weight <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "binary_weight must be a positive number, got {}",
                self.binary_weight
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommenderModel {
    config: BuildConfig,
    catalog: Catalog,
    vectorizer: TfidfVectorizer,
    features: Vec<Vector>,
    similarity: SimilarityMatrix,
}

impl RecommenderModel {
    /// Fit the model on a catalog snapshot. Deterministic for a given catalog
    /// and configuration.
    pub fn build(catalog: Catalog, config: BuildConfig) -> Result<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let texts: Vec<String> = catalog.iter().map(|t| t.text_blob()).collect();
        let vectorizer = TfidfVectorizer::fit(&texts, config.max_features)?;
        let features = build_feature_vectors(&catalog, &vectorizer, config.binary_weight);
        let similarity = SimilarityMatrix::compute(&features);

        info!(
            "Model built: {} tools, {} terms, feature dim {}",
            catalog.len(),
            vectorizer.vocabulary_size(),
            feature_dim(&vectorizer)
        );

        Ok(Self {
            config,
            catalog,
            vectorizer,
            features,
            similarity,
        })
    }

    /// Check the shapes of a deserialized model agree with each other
    pub fn validate(&self) -> Result<()> {
        self.vectorizer.validate()?;
        self.similarity.validate()?;

        let n = self.catalog.len();
        if n == 0 {
            return Err(Error::EmptyCatalog);
        }
        if self.features.len() != n || self.similarity.size() != n {
            return Err(Error::CorruptArtifact(format!(
                "{} tools, {} feature vectors, {}x{} similarity matrix",
                n,
                self.features.len(),
                self.similarity.size(),
                self.similarity.size()
            )));
        }
        let expected = feature_dim(&self.vectorizer);
        if let Some(bad) = self.features.iter().find(|f| f.dim() != expected) {
            return Err(Error::InvalidDimension {
                expected,
                actual: bad.dim(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    #[inline]
    pub fn features(&self) -> &[Vector] {
        &self.features
    }

    #[inline]
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    #[inline]
    pub fn feature_dim(&self) -> usize {
        feature_dim(&self.vectorizer)
    }

    /// Text block of an item's feature vector
    #[inline]
    pub fn text_features(&self, index: usize) -> &[f32] {
        &self.features[index].as_slice()[..self.vectorizer.dim()]
    }
}
