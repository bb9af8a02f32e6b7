//! Typed error conditions for the recommendation engine.
//!
//! All variants are expected, recoverable conditions returned to the caller;
//! nothing here is process-fatal. The transport layer maps these to HTTP
//! status codes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Train was called with an empty catalog.
    #[error("no items in catalog to train on")]
    EmptyCatalog,

    /// The vector space builder received zero documents.
    #[error("corpus contains no documents")]
    EmptyCorpus,

    /// A category/group aggregation target has no member items.
    #[error("no member items in the requested group or category")]
    EmptyGroup,

    /// The id is absent from the catalog.
    #[error("item {0} not found in catalog")]
    ItemNotFound(i64),

    /// The id exists in the catalog but not in the current snapshot.
    /// The index is stale; the caller should refresh.
    #[error("item {0} is not in the current index (stale model, refresh needed)")]
    ItemNotIndexed(i64),

    /// No snapshot exists in memory, in the model store, or trainable
    /// from the catalog.
    #[error("recommendation model not trained yet")]
    ModelNotTrained,

    /// A catalog collaborator failed (connection, query, file read).
    #[error("catalog error: {0}")]
    Catalog(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RecommendError>;
