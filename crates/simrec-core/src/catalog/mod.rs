//! Catalog store capability interface.
//!
//! The catalog is an external collaborator: a keyed collection of fully
//! hydrated item records (categories and image URLs already joined in),
//! queryable by id, category membership, and group membership. The engine
//! only requires a deterministic iteration order from [`get_all`] and
//! lookup by id; it never mutates records.
//!
//! The application crate provides the SQLite and CSV implementations.
//! [`memory::MemoryCatalog`] backs the engine tests.
//!
//! [`get_all`]: CatalogStore::get_all

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::ItemRecord;

pub use memory::MemoryCatalog;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All active items, in a stable order.
    async fn get_all(&self) -> Result<Vec<ItemRecord>>;

    /// One item by id, or `None` if absent.
    async fn get_by_id(&self, id: i64) -> Result<Option<ItemRecord>>;

    /// Member items of a category.
    async fn get_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>>;

    /// Member items of a product group.
    async fn get_by_group(&self, group_id: i64) -> Result<Vec<ItemRecord>>;
}
