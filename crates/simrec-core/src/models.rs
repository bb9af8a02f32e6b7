//! Core data models shared by the catalog backends and the engine.

use serde::{Deserialize, Serialize};

/// Neutral price assumed when a catalog source has no price column.
pub const DEFAULT_PRICE: f64 = 100_000.0;

/// Neutral star rating assumed when a catalog source has no rating.
pub const DEFAULT_RATING: i64 = 2;

/// A fully hydrated catalog item. Read-only to the engine; the catalog
/// collaborator owns it and is responsible for joining in categories and
/// image URLs.
///
/// `price` and `rating` are `None` only when the source genuinely lacks
/// the value; catalog backends are expected to fill [`DEFAULT_PRICE`] and
/// [`DEFAULT_RATING`] at the boundary so defaults are applied once, not
/// ad hoc per call site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<i64>,
    /// City or origin the item is associated with.
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_name: String,
    /// Distribution channel, free text.
    #[serde(default)]
    pub distribution: String,
    /// Free-text keywords field.
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// A recommended item with its similarity score. The synthetic content
/// document is never exposed here.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: ItemRecord,
    pub similarity_score: f64,
}

#[cfg(test)]
pub(crate) fn test_item(id: i64, name: &str) -> ItemRecord {
    ItemRecord {
        id,
        name: name.to_string(),
        description: String::new(),
        price: None,
        rating: None,
        origin: String::new(),
        group_id: None,
        group_name: String::new(),
        distribution: String::new(),
        keywords: String::new(),
        categories: Vec::new(),
        images: Vec::new(),
    }
}
