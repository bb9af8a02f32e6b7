//! CSV-backed [`CatalogStore`] for running against a flat product export
//! instead of the SQLite database.
//!
//! The export uses Vietnamese column headers. Rows are assigned sequential
//! ids starting at 1, and each distinct group name gets an id in first-seen
//! order. The group doubles as the row's single category, so category and
//! group ids share the same number space.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;

use simrec_core::catalog::CatalogStore;
use simrec_core::models::{ItemRecord, DEFAULT_PRICE, DEFAULT_RATING};

const HEADER_NAME: &str = "Tên sản phẩm";
const HEADER_STAR: &str = "Số sao";
const HEADER_ORIGIN: &str = "Xuất xứ";
const HEADER_GROUP: &str = "Loại sản phẩm";
const HEADER_DISTRIBUTION: &str = "Hệ thống phân phối";
const HEADER_KEYWORDS: &str = "Từ khóa";
const HEADER_DESCRIPTION: &str = "Mô tả";

pub struct CsvCatalog {
    items: Vec<ItemRecord>,
    group_ids: HashMap<String, i64>,
}

impl CsvCatalog {
    /// Load the whole CSV into memory. The file is read once; later catalog
    /// calls serve from the loaded snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open catalog CSV: {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);

        let col_name = column(HEADER_NAME);
        let col_star = column(HEADER_STAR);
        let col_origin = column(HEADER_ORIGIN);
        let col_group = column(HEADER_GROUP);
        let col_distribution = column(HEADER_DISTRIBUTION);
        let col_keywords = column(HEADER_KEYWORDS);
        let col_description = column(HEADER_DESCRIPTION);

        let mut items = Vec::new();
        let mut group_ids: HashMap<String, i64> = HashMap::new();

        for (row_index, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Failed to read CSV row {}", row_index + 2))?;
            let field = |col: Option<usize>| -> String {
                col.and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            };

            let group_name = field(col_group);
            let group_id = if group_name.is_empty() {
                None
            } else {
                let next_id = group_ids.len() as i64 + 1;
                Some(*group_ids.entry(group_name.clone()).or_insert(next_id))
            };

            let rating = field(col_star).parse::<i64>().ok();
            let categories = if group_name.is_empty() {
                Vec::new()
            } else {
                vec![group_name.clone()]
            };

            items.push(ItemRecord {
                id: row_index as i64 + 1,
                name: field(col_name),
                description: field(col_description),
                price: Some(DEFAULT_PRICE),
                rating: Some(rating.unwrap_or(DEFAULT_RATING)),
                origin: field(col_origin),
                group_id,
                group_name,
                distribution: field(col_distribution),
                keywords: field(col_keywords),
                categories,
                images: Vec::new(),
            });
        }

        Ok(Self { items, group_ids })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl CatalogStore for CsvCatalog {
    async fn get_all(&self) -> Result<Vec<ItemRecord>> {
        Ok(self.items.clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ItemRecord>> {
        Ok(self.items.iter().find(|item| item.id == id).cloned())
    }

    async fn get_by_category(&self, category_id: i64) -> Result<Vec<ItemRecord>> {
        // Categories are derived from groups, so the id spaces coincide.
        self.get_by_group(category_id).await
    }

    async fn get_by_group(&self, group_id: i64) -> Result<Vec<ItemRecord>> {
        let name = self
            .group_ids
            .iter()
            .find(|(_, id)| **id == group_id)
            .map(|(name, _)| name.clone());
        let name = match name {
            Some(name) => name,
            None => return Ok(Vec::new()),
        };
        Ok(self
            .items
            .iter()
            .filter(|item| item.group_name == name)
            .cloned()
            .collect())
    }
}
