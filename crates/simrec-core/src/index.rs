//! In-memory similarity index: one complete, immutable, point-in-time build
//! of the weighting model, term matrix, and row-aligned item table.
//!
//! A snapshot is created wholesale by a train/refresh operation, read-only
//! afterward, and replaced wholesale by the next one. There is exactly one
//! live snapshot at a time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{RecommendError, Result};
use crate::features::compose;
use crate::models::{ItemRecord, ScoredItem};
use crate::text::normalize;
use crate::vectorize::{SparseVector, TfidfModel, TfidfVectorizer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub model: TfidfModel,
    /// Row i holds the weighted-term vector for `items[i]`.
    pub matrix: Vec<SparseVector>,
    /// Item records aligned with matrix rows. Content documents are not
    /// retained after training.
    pub items: Vec<ItemRecord>,
    row_of: HashMap<i64, usize>,
}

impl Snapshot {
    /// Run the feature compositor over every item, fit the vector space over
    /// the resulting corpus, and return the complete snapshot.
    ///
    /// Fails with [`RecommendError::EmptyCorpus`] if `items` is empty.
    pub fn build(items: Vec<ItemRecord>, vectorizer: &TfidfVectorizer) -> Result<Self> {
        let corpus: Vec<String> = items.iter().map(compose).collect();
        let (model, matrix) = vectorizer.fit(&corpus)?;
        let row_of = items
            .iter()
            .enumerate()
            .map(|(row, item)| (item.id, row))
            .collect();
        Ok(Self {
            model,
            matrix,
            items,
            row_of,
        })
    }

    /// Number of indexed items (matrix rows).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item_id: i64) -> bool {
        self.row_of.contains_key(&item_id)
    }

    /// Most similar other items for an indexed item, descending by cosine
    /// similarity, ties broken by ascending row index. The queried row is
    /// always excluded, even on a tied top score.
    ///
    /// Fails with [`RecommendError::ItemNotIndexed`] if the id has no row.
    pub fn similar_to(&self, item_id: i64, k: usize) -> Result<Vec<ScoredItem>> {
        let row = *self
            .row_of
            .get(&item_id)
            .ok_or(RecommendError::ItemNotIndexed(item_id))?;
        Ok(self.rank(&self.matrix[row], Some(row), k))
    }

    /// Most similar items for an arbitrary text query, vectorized through the
    /// fitted model. All rows are ranked; the query is not a catalog row, so
    /// there is nothing to exclude.
    pub fn similar_to_text(&self, query: &str, k: usize) -> Vec<ScoredItem> {
        let query_vec = self.model.transform(&normalize(query));
        self.rank(&query_vec, None, k)
    }

    fn rank(&self, query: &SparseVector, exclude: Option<usize>, k: usize) -> Vec<ScoredItem> {
        let mut scored: Vec<(usize, f64)> = self
            .matrix
            .iter()
            .enumerate()
            .filter(|(row, _)| Some(*row) != exclude)
            .map(|(row, vec)| (row, query.cosine(vec)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(row, score)| ScoredItem {
                item: self.items[row].clone(),
                similarity_score: score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    fn named_items(names: &[&str]) -> Vec<ItemRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| test_item(i as i64 + 1, name))
            .collect()
    }

    fn build(names: &[&str]) -> Snapshot {
        Snapshot::build(named_items(names), &TfidfVectorizer::default()).unwrap()
    }

    #[test]
    fn test_build_empty_fails() {
        let result = Snapshot::build(Vec::new(), &TfidfVectorizer::default());
        assert!(matches!(result, Err(RecommendError::EmptyCorpus)));
    }

    #[test]
    fn test_build_row_alignment() {
        let snapshot = build(&["gold ring", "gold bracelet", "silver watch"]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.matrix.len(), snapshot.items.len());
        assert!(snapshot.contains(1));
        assert!(!snapshot.contains(99));
    }

    #[test]
    fn test_similar_to_excludes_self() {
        let snapshot = build(&["gold ring", "gold bracelet", "silver watch"]);
        let results = snapshot.similar_to(1, 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.item.id != 1));
    }

    #[test]
    fn test_duplicate_document_scores_one() {
        // Rows 0 and 1 are identical; the duplicate must rank first at 1.0,
        // and self-exclusion must hold even on the tied top score.
        let snapshot = build(&["gold ring", "gold ring", "silver watch"]);
        let results = snapshot.similar_to(1, 1).unwrap();
        assert_eq!(results[0].item.id, 2);
        assert!((results[0].similarity_score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_scores_non_increasing() {
        let snapshot = build(&[
            "gold ring",
            "gold ring bracelet",
            "gold bracelet",
            "silver watch",
        ]);
        let results = snapshot.similar_to(1, 10).unwrap();
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[test]
    fn test_ties_break_by_row_order() {
        // Items 3 and 4 are unrelated to item 1, both scoring 0.0.
        let snapshot = build(&["gold ring", "gold bracelet", "silver watch", "linen dress"]);
        let results = snapshot.similar_to(1, 10).unwrap();
        assert_eq!(results[0].item.id, 2);
        assert_eq!(results[1].item.id, 3);
        assert_eq!(results[2].item.id, 4);
    }

    #[test]
    fn test_k_larger_than_corpus_returns_all() {
        let snapshot = build(&["gold ring", "gold bracelet"]);
        let results = snapshot.similar_to(1, 50).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_not_indexed() {
        let snapshot = build(&["gold ring", "gold bracelet"]);
        let result = snapshot.similar_to(42, 5);
        assert!(matches!(result, Err(RecommendError::ItemNotIndexed(42))));
    }

    #[test]
    fn test_similar_to_text_ranks_all_rows() {
        let snapshot = build(&["gold ring", "gold bracelet", "silver watch"]);
        let results = snapshot.similar_to_text("gold", 10);
        assert_eq!(results.len(), 3);
        // Both gold items outrank the silver watch.
        assert!(results[0].similarity_score > 0.0);
        assert!(results[1].similarity_score > 0.0);
        assert_eq!(results[2].similarity_score, 0.0);
    }

    #[test]
    fn test_similar_to_text_normalizes_query() {
        let snapshot = build(&["gold ring", "silver watch"]);
        let plain = snapshot.similar_to_text("gold", 2);
        let fullwidth = snapshot.similar_to_text("ＧＯＬＤ", 2);
        assert_eq!(plain[0].item.id, fullwidth[0].item.id);
        assert!((plain[0].similarity_score - fullwidth[0].similarity_score).abs() < 1e-9);
    }

    #[test]
    fn test_no_content_document_in_results() {
        // ScoredItem carries the catalog record plus the score only; this is
        // a compile-time shape, asserted here for the serialized form.
        let snapshot = build(&["gold ring", "gold bracelet"]);
        let results = snapshot.similar_to(1, 1).unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();
        assert!(json.get("content").is_none());
        assert!(json.get("similarity_score").is_some());
        assert_eq!(json.get("name").unwrap(), "gold bracelet");
    }
}
