//! # toolrec
//!
//! Content-based recommendations over a catalog of AI tools.
//!
//! Each tool is described by a short text (category, modality, company) and a
//! set of binary attributes (open source, API available, modality flags). The
//! text is turned into TF-IDF features, the binary attributes are min-max
//! scaled and weighted, and the pairwise cosine similarity of the concatenated
//! vectors drives "more like this" queries.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! toolrec --catalog data/ai_tools.csv serve --http-port 5000
//! curl "http://localhost:5000/api/recommend/ChatGPT?n=3&open_source=1"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use toolrec::prelude::*;
//!
//! let catalog = Catalog::from_path("data/ai_tools.csv").unwrap();
//! let model = RecommenderModel::build(catalog, BuildConfig::default()).unwrap();
//! let service = RecommenderService::new(model);
//!
//! let filters = AttributeFilter::new().with("open_source", 1);
//! for tool in service.similar_to_item("ChatGPT", 5, &filters).unwrap() {
//!     println!("{} ({:?})", tool.name, tool.similarity_score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `toolrec-core` - catalog, feature extraction, similarity matrix, query service
//! - `toolrec-storage` - model artifact persistence and load-or-build startup
//! - `toolrec-api` - REST API

// Re-export core types
pub use toolrec_core::{
    AttributeFilter, BuildConfig, Catalog, CatalogStats, Error, Filter, RecommenderModel,
    RecommenderService, Result, SimilarityMatrix, TfidfVectorizer, ToolFlags, ToolRecord,
    ToolSummary, Vector, BINARY_COLUMNS,
};

// Re-export storage
pub use toolrec_storage::{ArtifactStore, ModelManager, ModelOrigin};

// Re-export API
pub use toolrec_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactStore, AttributeFilter, BuildConfig, Catalog, CatalogStats, Error, Filter,
        ModelManager, ModelOrigin, RecommenderModel, RecommenderService, RestApi, Result,
        ToolRecord, ToolSummary,
    };
}
