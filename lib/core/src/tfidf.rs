//! TF-IDF text vectorizer
//!
//! Fitted once over the catalog text blobs and then frozen: the vocabulary and
//! idf weights are persisted with the model and reused verbatim for query-time
//! transforms.
//!
//! ```text
//! idf(t)      = ln((1 + n) / (1 + df(t))) + 1
//! tfidf(t, d) = count(t, d) * idf(t), row L2-normalized
//! ```

use crate::stopwords::is_stop_word;
use crate::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    // term -> column index; columns are assigned in alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Tokenize text: lowercase, split on anything that is not alphanumeric
    /// or `_`, drop tokens shorter than two characters and stop words
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|s| s.chars().count() > 1 && !is_stop_word(s))
            .map(str::to_string)
            .collect()
    }

    /// Learn the vocabulary and idf weights from `documents`
    ///
    /// The vocabulary keeps at most `max_features` terms, chosen by total
    /// term count across the corpus with ties broken alphabetically.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Result<Self> {
        if max_features == 0 {
            return Err(Error::InvalidConfig("max_features must be > 0".to_string()));
        }
        if documents.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut term_counts: AHashMap<String, usize> = AHashMap::new();
        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();

        for doc in documents {
            let tokens = Self::tokenize(doc.as_ref());
            let mut seen = HashSet::new();
            for token in tokens {
                *term_counts.entry(token.clone()).or_insert(0) += 1;
                if seen.insert(token.clone()) {
                    *doc_freq.entry(token).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort();

        let n_docs = documents.len() as f32;
        let idf = terms
            .iter()
            .map(|t| {
                let df = doc_freq.get(t).copied().unwrap_or(0) as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(idx, term)| (term, idx))
            .collect();

        Ok(Self {
            max_features,
            vocabulary,
            idf,
        })
    }

    /// Output dimension, always `max_features` regardless of vocabulary size
    #[inline]
    pub fn dim(&self) -> usize {
        self.max_features
    }

    #[inline]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// Transform a document with the fitted vocabulary. Out-of-vocabulary
    /// terms are ignored; a document with no known terms maps to zeros.
    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut out = vec![0.0f32; self.max_features];
        for token in Self::tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                out[idx] += 1.0;
            }
        }
        for (value, idf) in out.iter_mut().zip(self.idf.iter()) {
            *value *= idf;
        }

        let norm = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut out {
                *value /= norm;
            }
        }
        out
    }

    /// Check the persisted state is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.idf.len() != self.vocabulary.len() || self.vocabulary.len() > self.max_features {
            return Err(Error::CorruptArtifact(format!(
                "vectorizer has {} terms, {} idf weights, dim {}",
                self.vocabulary.len(),
                self.idf.len(),
                self.max_features
            )));
        }
        if self.vocabulary.values().any(|&idx| idx >= self.idf.len()) {
            return Err(Error::CorruptArtifact(
                "vectorizer column index out of range".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        let tokens = TfidfVectorizer::tokenize("Image-Generation and the Text_AI a b");
        assert_eq!(tokens, vec!["image", "generation", "text_ai"]);
    }

    #[test]
    fn test_fit_vocabulary_alphabetical() {
        let docs = ["chatbot text openai", "chatbot text meta", "image stability"];
        let v = TfidfVectorizer::fit(&docs, 100).unwrap();
        let terms: Vec<&String> = v.vocabulary().keys().collect();
        assert_eq!(terms, vec!["chatbot", "image", "meta", "openai", "stability", "text"]);
        assert_eq!(v.vocabulary()["chatbot"], 0);
        assert_eq!(v.dim(), 100);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let docs = ["alpha beta", "alpha gamma", "alpha beta delta"];
        let v = TfidfVectorizer::fit(&docs, 2).unwrap();
        assert_eq!(v.vocabulary_size(), 2);
        assert!(v.vocabulary().contains_key("alpha"));
        assert!(v.vocabulary().contains_key("beta"));
    }

    #[test]
    fn test_transform_normalized_and_padded() {
        let docs = ["chatbot text openai", "image stability"];
        let v = TfidfVectorizer::fit(&docs, 10).unwrap();
        let row = v.transform("chatbot text openai");
        assert_eq!(row.len(), 10);
        let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transform_unknown_terms_is_zero() {
        let v = TfidfVectorizer::fit(&["chatbot text"], 10).unwrap();
        assert!(v.transform("   ").iter().all(|&x| x == 0.0));
        assert!(v.transform("unseen words").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let docs = ["common rare", "common", "common"];
        let v = TfidfVectorizer::fit(&docs, 10).unwrap();
        let row = v.transform("common rare");
        let common = row[v.vocabulary()["common"]];
        let rare = row[v.vocabulary()["rare"]];
        assert!(rare > common);
    }

    #[test]
    fn test_zero_max_features_rejected() {
        assert!(matches!(
            TfidfVectorizer::fit(&["a b"], 0),
            Err(Error::InvalidConfig(_))
        ));
    }
}
