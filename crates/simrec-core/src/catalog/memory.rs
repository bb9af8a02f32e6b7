//! In-memory [`CatalogStore`] implementation for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ItemRecord;

use super::CatalogStore;

/// Fixed item collection with explicit category memberships. Items iterate
/// in insertion order; `replace_items` swaps the collection to model a
/// catalog that changes between train and refresh.
pub struct MemoryCatalog {
    items: RwLock<Vec<ItemRecord>>,
    categories: HashMap<i64, Vec<i64>>,
}

impl MemoryCatalog {
    pub fn new(items: Vec<ItemRecord>) -> Self {
        Self {
            items: RwLock::new(items),
            categories: HashMap::new(),
        }
    }

    /// Declare a category and its member item ids.
    pub fn with_category(mut self, category_id: i64, member_ids: Vec<i64>) -> Self {
        self.categories.insert(category_id, member_ids);
        self
    }

    /// Swap the whole item collection.
    pub fn replace_items(&self, items: Vec<ItemRecord>) {
        *self.items.write().unwrap() = items;
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn get_all(&self) -> Result<Vec<ItemRecord>> {
        Ok(self.items.read().unwrap().clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ItemRecord>> {
        Ok(self
            .items
            .read()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn get_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>> {
        let member_ids = match self.categories.get(&category_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        let items = self.items.read().unwrap();
        Ok(items
            .iter()
            .filter(|item| member_ids.contains(&item.id))
            .cloned()
            .collect())
    }

    async fn get_by_group(&self, group_id: i64) -> Result<Vec<ItemRecord>> {
        Ok(self
            .items
            .read()
            .unwrap()
            .iter()
            .filter(|item| item.group_id == Some(group_id))
            .cloned()
            .collect())
    }
}
