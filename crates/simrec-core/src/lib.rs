//! # simrec core
//!
//! Content-based similarity engine for catalog recommendations: turns
//! heterogeneous item records into a normalized text corpus, fits a TF-IDF
//! vector space over it, and answers nearest-neighbor queries with cosine
//! similarity.
//!
//! This crate contains no tokio, sqlx, or HTTP dependencies. Catalog and
//! model-store backends plug in through the [`catalog::CatalogStore`] and
//! [`store::ModelStore`] traits; the application crate provides the SQLite,
//! CSV, and on-disk implementations.
//!
//! ## Pipeline
//!
//! ```text
//! CatalogStore ──▶ features::compose (per item)
//!              ──▶ TfidfVectorizer::fit (corpus-wide, on train/refresh)
//!              ──▶ Snapshot (in memory, mirrored to ModelStore)
//!              ──▶ Recommender (per query)
//! ```

pub mod catalog;
pub mod error;
pub mod features;
pub mod index;
pub mod models;
pub mod recommend;
pub mod store;
pub mod text;
pub mod vectorize;

pub use error::RecommendError;
pub use index::Snapshot;
pub use models::{ItemRecord, ScoredItem};
pub use recommend::Recommender;
pub use vectorize::TfidfVectorizer;
