//! Recommendation orchestrator: the public operation set composing the
//! catalog, the similarity index, and the model store.
//!
//! The live snapshot is explicitly owned here, behind a read-write lock:
//! readers clone the `Arc` and query concurrently, a train/refresh builds
//! the new snapshot completely before swapping it in, so queries observe
//! either the prior complete snapshot or the new one, never an intermediate.
//! A failed refresh leaves the previous snapshot current and usable.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::catalog::CatalogStore;
use crate::error::{RecommendError, Result};
use crate::index::Snapshot;
use crate::models::{ItemRecord, ScoredItem};
use crate::store::ModelStore;
use crate::vectorize::TfidfVectorizer;

pub struct Recommender {
    catalog: Arc<dyn CatalogStore>,
    store: Box<dyn ModelStore>,
    vectorizer: TfidfVectorizer,
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl Recommender {
    pub fn new(catalog: Arc<dyn CatalogStore>, store: Box<dyn ModelStore>) -> Self {
        Self {
            catalog,
            store,
            vectorizer: TfidfVectorizer::default(),
            current: RwLock::new(None),
        }
    }

    /// Override the document-frequency bounds used at train time.
    pub fn with_vectorizer(mut self, vectorizer: TfidfVectorizer) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    /// The live snapshot, if one exists.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().unwrap().clone()
    }

    /// Build a fresh snapshot from the current catalog, persist it, and
    /// replace the in-memory snapshot wholesale.
    ///
    /// Fails with [`RecommendError::EmptyCatalog`] for an empty catalog. On
    /// any failure the prior snapshot (if any) remains current. A
    /// persistence failure after a successful build is logged and does not
    /// fail the train.
    pub async fn train(&self) -> Result<Arc<Snapshot>> {
        let items = self.catalog.get_all().await?;
        if items.is_empty() {
            return Err(RecommendError::EmptyCatalog);
        }

        let snapshot = Arc::new(Snapshot::build(items, &self.vectorizer)?);

        if let Err(err) = self.store.save(&snapshot) {
            eprintln!("warning: failed to persist model snapshot: {err:#}");
        }

        *self.current.write().unwrap() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Rebuild from the latest catalog contents. Identical to [`train`];
    /// the name exists for schedulers that call it on a timer.
    ///
    /// [`train`]: Recommender::train
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        self.train().await
    }

    /// Most similar items to a catalog item.
    ///
    /// The id is checked against the CATALOG first: an item deleted from the
    /// catalog but stale in an unrefreshed index is rejected with
    /// [`RecommendError::ItemNotFound`].
    pub async fn recommend_for_item(&self, item_id: i64, k: usize) -> Result<Vec<ScoredItem>> {
        if self.catalog.get_by_id(item_id).await?.is_none() {
            return Err(RecommendError::ItemNotFound(item_id));
        }
        let snapshot = self.snapshot_or_train().await?;
        snapshot.similar_to(item_id, k)
    }

    /// Most similar items to a free-text keyword query.
    pub async fn recommend_for_keywords(&self, query: &str, k: usize) -> Result<Vec<ScoredItem>> {
        let snapshot = self.snapshot_or_train().await?;
        Ok(snapshot.similar_to_text(query, k))
    }

    /// Aggregated recommendations across all items of a category.
    pub async fn recommend_for_category(
        &self,
        category_id: i64,
        k: usize,
    ) -> Result<Vec<ScoredItem>> {
        let members = self.catalog.get_by_category(category_id).await?;
        self.aggregate(&members, k).await
    }

    /// Aggregated recommendations across all items of a product group.
    pub async fn recommend_for_group(&self, group_id: i64, k: usize) -> Result<Vec<ScoredItem>> {
        let members = self.catalog.get_by_group(group_id).await?;
        self.aggregate(&members, k).await
    }

    /// Per-member similarity queries merged into one de-duplicated ranking:
    /// first occurrence of a recommended id wins, results sort descending by
    /// score with ascending item id as the tie-break, truncated to `k`.
    /// Members absent from the index (stale between refreshes) are skipped.
    /// Members of the original group may themselves appear in the result.
    async fn aggregate(&self, members: &[ItemRecord], k: usize) -> Result<Vec<ScoredItem>> {
        if members.is_empty() {
            return Err(RecommendError::EmptyGroup);
        }
        let snapshot = self.snapshot_or_train().await?;

        let mut seen: HashSet<i64> = HashSet::new();
        let mut merged: Vec<ScoredItem> = Vec::new();
        for member in members {
            let recs = match snapshot.similar_to(member.id, k) {
                Ok(recs) => recs,
                Err(RecommendError::ItemNotIndexed(_)) => continue,
                Err(err) => return Err(err),
            };
            for rec in recs {
                if seen.insert(rec.item.id) {
                    merged.push(rec);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.item.id.cmp(&b.item.id))
        });
        merged.truncate(k);
        Ok(merged)
    }

    /// Resolve a snapshot for a read query: in-memory first, then the model
    /// store, then a from-scratch train as a last resort. A store read
    /// failure is logged and treated as absent.
    async fn snapshot_or_train(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.current.read().unwrap().clone() {
            return Ok(snapshot);
        }

        match self.store.load() {
            Ok(Some(snapshot)) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write().unwrap() = Some(snapshot.clone());
                return Ok(snapshot);
            }
            Ok(None) => {}
            Err(err) => {
                eprintln!("warning: failed to load model snapshot: {err:#}");
            }
        }

        match self.train().await {
            Ok(snapshot) => Ok(snapshot),
            // Nothing in memory, nothing on disk, nothing to train on.
            Err(RecommendError::EmptyCatalog) => Err(RecommendError::ModelNotTrained),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::models::test_item;
    use crate::store::MemoryModelStore;

    fn item(id: i64, name: &str, price: f64) -> ItemRecord {
        let mut item = test_item(id, name);
        item.price = Some(price);
        item
    }

    fn jewelry_catalog() -> Vec<ItemRecord> {
        vec![
            item(1, "gold ring", 40_000.0),
            item(2, "gold bracelet", 45_000.0),
            item(3, "silver watch", 300_000.0),
        ]
    }

    fn recommender(items: Vec<ItemRecord>) -> Recommender {
        Recommender::new(
            Arc::new(MemoryCatalog::new(items)),
            Box::new(MemoryModelStore::new()),
        )
    }

    /// Model store whose every operation fails, for persistence-failure paths.
    struct BrokenModelStore;

    impl ModelStore for BrokenModelStore {
        fn save(&self, _snapshot: &Snapshot) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full"))
        }

        fn load(&self) -> anyhow::Result<Option<Snapshot>> {
            Err(anyhow::anyhow!("snapshot unreadable"))
        }
    }

    #[tokio::test]
    async fn test_item_with_shared_tokens_ranks_first() {
        // A and B share the "gold" token and the very_low price bucket; C
        // shares nothing with A.
        let rec = recommender(jewelry_catalog());
        rec.train().await.unwrap();

        let results = rec.recommend_for_item(1, 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, 2);
        assert!(results[0].similarity_score > 0.0);
    }

    #[tokio::test]
    async fn test_recommend_is_idempotent_against_unchanged_snapshot() {
        let rec = recommender(jewelry_catalog());
        rec.train().await.unwrap();

        let first = rec.recommend_for_item(1, 3).await.unwrap();
        let second = rec.recommend_for_item(1, 3).await.unwrap();
        let ids: Vec<i64> = first.iter().map(|r| r.item.id).collect();
        let ids_again: Vec<i64> = second.iter().map(|r| r.item.id).collect();
        assert_eq!(ids, ids_again);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.similarity_score, b.similarity_score);
        }
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let rec = recommender(jewelry_catalog());
        rec.train().await.unwrap();

        let result = rec.recommend_for_item(99, 5).await;
        assert!(matches!(result, Err(RecommendError::ItemNotFound(99))));
    }

    #[tokio::test]
    async fn test_item_deleted_from_catalog_is_rejected_before_the_index() {
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let rec = Recommender::new(catalog.clone(), Box::new(MemoryModelStore::new()));
        rec.train().await.unwrap();

        // Item 3 disappears from the catalog but stays in the stale index.
        catalog.replace_items(vec![
            item(1, "gold ring", 40_000.0),
            item(2, "gold bracelet", 45_000.0),
        ]);
        let result = rec.recommend_for_item(3, 5).await;
        assert!(matches!(result, Err(RecommendError::ItemNotFound(3))));
    }

    #[tokio::test]
    async fn test_train_on_empty_catalog_fails() {
        let rec = recommender(Vec::new());
        let result = rec.train().await;
        assert!(matches!(result, Err(RecommendError::EmptyCatalog)));
        assert!(rec.current().is_none());
    }

    #[tokio::test]
    async fn test_recommend_without_any_model_is_not_trained() {
        let rec = recommender(Vec::new());
        let result = rec.recommend_for_keywords("gold", 5).await;
        assert!(matches!(result, Err(RecommendError::ModelNotTrained)));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_prior_snapshot() {
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let rec = Recommender::new(catalog.clone(), Box::new(MemoryModelStore::new()));
        let trained = rec.train().await.unwrap();

        catalog.replace_items(Vec::new());
        let result = rec.refresh().await;
        assert!(matches!(result, Err(RecommendError::EmptyCatalog)));

        let current = rec.current().expect("prior snapshot must survive");
        assert_eq!(current.len(), trained.len());
        // Queries against the surviving snapshot still work (item 1 is gone
        // from the catalog now, so go through keywords).
        let results = rec.recommend_for_keywords("gold ring", 2).await.unwrap();
        assert_eq!(results[0].item.id, 1);
    }

    #[tokio::test]
    async fn test_train_succeeds_when_persistence_fails() {
        // A save failure is logged and swallowed; the in-memory snapshot
        // must still be installed and queryable.
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let rec = Recommender::new(catalog, Box::new(BrokenModelStore));

        let snapshot = rec.train().await.expect("train must survive a save failure");
        assert_eq!(snapshot.len(), 3);
        assert!(rec.current().is_some());

        let results = rec.recommend_for_item(1, 1).await.unwrap();
        assert_eq!(results[0].item.id, 2);
    }

    #[tokio::test]
    async fn test_store_load_failure_falls_back_to_training() {
        // A load failure on the lazy path is treated as "no snapshot on
        // disk": the read query trains from the catalog instead of failing.
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let rec = Recommender::new(catalog, Box::new(BrokenModelStore));

        let results = rec.recommend_for_keywords("silver watch", 1).await.unwrap();
        assert_eq!(results[0].item.id, 3);
        assert!(rec.current().is_some());
    }

    #[tokio::test]
    async fn test_lazy_load_from_model_store() {
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let store = MemoryModelStore::new();

        // First instance trains and persists.
        {
            let rec = Recommender::new(catalog.clone(), Box::new(MemoryModelStore::new()));
            let snapshot = rec.train().await.unwrap();
            store.save(&snapshot).unwrap();
        }

        // Second instance starts cold on an EMPTY catalog: the snapshot must
        // come from the store, not a retrain.
        let empty_catalog = Arc::new(MemoryCatalog::new(Vec::new()));
        let rec = Recommender::new(empty_catalog, Box::new(store));
        let results = rec.recommend_for_keywords("silver watch", 1).await.unwrap();
        assert_eq!(results[0].item.id, 3);
    }

    #[tokio::test]
    async fn test_keywords_rank_matching_items_first() {
        let rec = recommender(jewelry_catalog());
        rec.train().await.unwrap();

        let results = rec.recommend_for_keywords("silver watch", 3).await.unwrap();
        assert_eq!(results[0].item.id, 3);
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[tokio::test]
    async fn test_group_aggregation_dedups_shared_recommendations() {
        // Items 1 and 2 are one group; both independently recommend item 3
        // (and each other). The merge must keep one instance per id.
        let mut a = item(1, "gold ring classic", 40_000.0);
        let mut b = item(2, "gold ring deluxe", 45_000.0);
        let c = item(3, "gold ring supreme", 42_000.0);
        a.group_id = Some(10);
        b.group_id = Some(10);

        let rec = recommender(vec![a, b, c]);
        rec.train().await.unwrap();

        let results = rec.recommend_for_group(10, 10).await.unwrap();
        let mut ids: Vec<i64> = results.iter().map(|r| r.item.id).collect();
        let len_before = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), len_before);
        assert!(ids.contains(&3));
    }

    #[tokio::test]
    async fn test_group_results_sorted_and_truncated() {
        let mut items = jewelry_catalog();
        items[0].group_id = Some(7);
        items[1].group_id = Some(7);
        let rec = recommender(items);
        rec.train().await.unwrap();

        let results = rec.recommend_for_group(7, 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_group_fails() {
        let rec = recommender(jewelry_catalog());
        rec.train().await.unwrap();

        let result = rec.recommend_for_group(404, 5).await;
        assert!(matches!(result, Err(RecommendError::EmptyGroup)));
    }

    #[tokio::test]
    async fn test_category_aggregation_matches_group_shape() {
        let catalog = MemoryCatalog::new(jewelry_catalog()).with_category(5, vec![1, 2]);
        let rec = Recommender::new(Arc::new(catalog), Box::new(MemoryModelStore::new()));
        rec.train().await.unwrap();

        let results = rec.recommend_for_category(5, 10).await.unwrap();
        assert!(!results.is_empty());
        for pair in results.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[tokio::test]
    async fn test_stale_group_member_is_skipped() {
        let catalog = Arc::new(MemoryCatalog::new(jewelry_catalog()));
        let rec = Recommender::new(catalog.clone(), Box::new(MemoryModelStore::new()));
        rec.train().await.unwrap();

        // Item 4 joins the catalog after training; it is a group member but
        // has no index row yet and must be skipped, not fail the query.
        let mut items = jewelry_catalog();
        let mut newcomer = item(4, "gold pendant", 41_000.0);
        newcomer.group_id = Some(7);
        items[0].group_id = Some(7);
        items.push(newcomer);
        catalog.replace_items(items);

        let results = rec.recommend_for_group(7, 5).await.unwrap();
        assert!(results.iter().all(|r| r.item.id != 4));
        assert!(!results.is_empty());
    }
}
