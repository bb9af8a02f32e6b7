//! Wires the configured catalog backend and model store into a
//! [`Recommender`]. Shared by the CLI commands and the HTTP server.

use std::sync::Arc;

use anyhow::{bail, Result};

use simrec_core::catalog::CatalogStore;
use simrec_core::vectorize::TfidfVectorizer;
use simrec_core::Recommender;

use crate::catalog_csv::CsvCatalog;
use crate::catalog_db::SqliteCatalog;
use crate::config::Config;
use crate::db;
use crate::model_file::FileModelStore;

pub async fn build_recommender(config: &Config) -> Result<Recommender> {
    let catalog: Arc<dyn CatalogStore> = match config.catalog.source.as_str() {
        "database" => {
            let pool = db::connect(&config.db.path).await?;
            Arc::new(SqliteCatalog::new(pool))
        }
        "csv" => {
            // Presence of the path is validated at config load time.
            let path = match &config.catalog.csv_path {
                Some(path) => path,
                None => bail!("catalog.csv_path is not set"),
            };
            let catalog = CsvCatalog::load(path)?;
            println!("Loaded {} items from {}", catalog.len(), path.display());
            Arc::new(catalog)
        }
        other => bail!("Unknown catalog source: '{}'", other),
    };

    let store = Box::new(FileModelStore::new(config.model.path.clone()));
    let vectorizer = TfidfVectorizer::new(config.recommend.min_df, config.recommend.max_df);

    Ok(Recommender::new(catalog, store).with_vectorizer(vectorizer))
}
