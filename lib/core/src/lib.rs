//! # toolrec Core
//!
//! Core library for the toolrec recommendation service.
//!
//! This crate provides the content-based similarity model and its queries:
//!
//! - [`Catalog`] / [`ToolRecord`] - validated catalog rows loaded from CSV
//! - [`TfidfVectorizer`] - frozen TF-IDF text features
//! - [`SimilarityMatrix`] - pairwise cosine similarity over feature vectors
//! - [`RecommenderModel`] - everything the builder produces, serializable as one artifact
//! - [`RecommenderService`] - read-only similar-item, category, search and statistics queries
//!
//! ## Example
//!
//! ```rust
//! use toolrec_core::{
//!     AttributeFilter, BuildConfig, Catalog, RecommenderModel, RecommenderService, ToolRecord,
//! };
//!
//! let catalog = Catalog::new(vec![
//!     ToolRecord::new("ChatGPT").with_company("OpenAI").with_category("Chatbot"),
//!     ToolRecord::new("Llama").with_company("Meta").with_category("Chatbot")
//!         .with_flag("open_source", true),
//! ]);
//! let model = RecommenderModel::build(catalog, BuildConfig::default()).unwrap();
//! let service = RecommenderService::new(model);
//!
//! let filters = AttributeFilter::new().with("open_source", 1);
//! let results = service.similar_to_item("chatgpt", 5, &filters).unwrap();
//! assert_eq!(results[0].name, "Llama");
//! ```

pub mod catalog;
pub mod error;
pub mod features;
pub mod filter;
pub mod model;
pub mod service;
pub mod similarity;
pub mod stats;
pub mod stopwords;
pub mod tfidf;
pub mod vector;

pub use catalog::{Catalog, ToolFlags, ToolRecord, BINARY_COLUMNS};
pub use error::{Error, Result};
pub use filter::{AttributeFilter, Filter};
pub use model::{BuildConfig, RecommenderModel};
pub use service::{RecommenderService, ToolSummary};
pub use similarity::SimilarityMatrix;
pub use stats::CatalogStats;
pub use tfidf::TfidfVectorizer;
pub use vector::Vector;
