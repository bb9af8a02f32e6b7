//! SQLite-backed [`CatalogStore`].
//!
//! Rows are hydrated into [`ItemRecord`]s with category names and image
//! URLs attached. Soft-deleted and inactive products are never returned.
//! Missing price and rating values get catalog-wide defaults here so the
//! feature compositor downstream always sees fully populated records.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use simrec_core::catalog::CatalogStore;
use simrec_core::models::{ItemRecord, DEFAULT_PRICE, DEFAULT_RATING};

pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fetch products matching an extra WHERE fragment and hydrate them.
    async fn fetch_items(&self, where_extra: &str, bind: Option<i64>) -> Result<Vec<ItemRecord>> {
        let sql = format!(
            r#"
            SELECT p.id, p.name, p.description, p.price, p.rating, p.origin,
                   p.group_id, g.name AS group_name, p.distribution, p.keywords
            FROM products p
            LEFT JOIN product_groups g ON g.id = p.group_id
            WHERE p.is_active = 1 AND p.deleted_at IS NULL{}
            ORDER BY p.id
            "#,
            where_extra
        );

        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let price: Option<f64> = row.try_get("price")?;
            let rating: Option<i64> = row.try_get("rating")?;
            items.push(ItemRecord {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                description: row.try_get("description")?,
                price: Some(price.unwrap_or(DEFAULT_PRICE)),
                rating: Some(rating.unwrap_or(DEFAULT_RATING)),
                origin: row.try_get("origin")?,
                group_id: row.try_get("group_id")?,
                group_name: row
                    .try_get::<Option<String>, _>("group_name")?
                    .unwrap_or_default(),
                distribution: row.try_get("distribution")?,
                keywords: row.try_get("keywords")?,
                categories: Vec::new(),
                images: Vec::new(),
            });
        }

        self.hydrate(&mut items).await?;
        Ok(items)
    }

    /// Attach category names and image URLs to already-fetched items.
    async fn hydrate(&self, items: &mut [ItemRecord]) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut categories: HashMap<i64, Vec<String>> = HashMap::new();
        let rows = sqlx::query(
            r#"
            SELECT pc.product_id, c.name
            FROM product_categories pc
            JOIN categories c ON c.id = pc.category_id
            ORDER BY pc.product_id, pc.category_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        for row in rows {
            let product_id: i64 = row.try_get("product_id")?;
            let name: String = row.try_get("name")?;
            categories.entry(product_id).or_default().push(name);
        }

        let mut images: HashMap<i64, Vec<String>> = HashMap::new();
        let rows = sqlx::query("SELECT product_id, url FROM images ORDER BY product_id, id")
            .fetch_all(&self.pool)
            .await?;
        for row in rows {
            let product_id: i64 = row.try_get("product_id")?;
            let url: String = row.try_get("url")?;
            images.entry(product_id).or_default().push(url);
        }

        for item in items.iter_mut() {
            if let Some(names) = categories.remove(&item.id) {
                item.categories = names;
            }
            if let Some(urls) = images.remove(&item.id) {
                item.images = urls;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn get_all(&self) -> Result<Vec<ItemRecord>> {
        self.fetch_items("", None).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ItemRecord>> {
        let mut items = self.fetch_items(" AND p.id = ?", Some(id)).await?;
        Ok(items.pop())
    }

    async fn get_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>> {
        self.fetch_items(
            " AND p.id IN (SELECT product_id FROM product_categories WHERE category_id = ?)",
            Some(category_id),
        )
        .await
    }

    async fn get_by_group(&self, group_id: i64) -> Result<Vec<ItemRecord>> {
        self.fetch_items(" AND p.group_id = ?", Some(group_id)).await
    }
}
