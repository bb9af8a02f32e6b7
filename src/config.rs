use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Where the trained snapshot is persisted.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./data/model.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Catalog backend: `database` (SQLite) or `csv` (flat file).
    #[serde(default = "default_catalog_source")]
    pub source: String,
    /// CSV file path, required when `source = "csv"`.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_catalog_source(),
            csv_path: None,
        }
    }
}

fn default_catalog_source() -> String {
    "database".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecommendConfig {
    /// Results returned when the caller does not pass `k`.
    #[serde(default = "default_k")]
    pub default_k: usize,
    /// Lower document-frequency bound, fraction of corpus size.
    #[serde(default = "default_min_df")]
    pub min_df: f64,
    /// Upper document-frequency bound, fraction of corpus size.
    #[serde(default = "default_max_df")]
    pub max_df: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            min_df: default_min_df(),
            max_df: default_max_df(),
        }
    }
}

fn default_k() -> usize {
    5
}
fn default_min_df() -> f64 {
    simrec_core::vectorize::DEFAULT_MIN_DF
}
fn default_max_df() -> f64 {
    simrec_core::vectorize::DEFAULT_MAX_DF
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Whether `serve` spawns the periodic refresh task.
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    /// Seconds between refreshes (default: daily).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Base backoff after a failed refresh, doubled per consecutive failure.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            refresh_interval_secs: default_refresh_interval(),
            retry_backoff_secs: default_retry_backoff(),
        }
    }
}

fn default_scheduler_enabled() -> bool {
    true
}
fn default_refresh_interval() -> u64 {
    86_400
}
fn default_retry_backoff() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.recommend.default_k < 1 {
        anyhow::bail!("recommend.default_k must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.recommend.min_df)
        || !(0.0..=1.0).contains(&config.recommend.max_df)
        || config.recommend.min_df > config.recommend.max_df
    {
        anyhow::bail!("recommend.min_df and max_df must satisfy 0 <= min_df <= max_df <= 1");
    }

    match config.catalog.source.as_str() {
        "database" => {}
        "csv" => {
            if config.catalog.csv_path.is_none() {
                anyhow::bail!("catalog.csv_path must be set when catalog.source is 'csv'");
            }
        }
        other => anyhow::bail!(
            "Unknown catalog source: '{}'. Must be database or csv.",
            other
        ),
    }

    if config.scheduler.refresh_interval_secs == 0 {
        anyhow::bail!("scheduler.refresh_interval_secs must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let file = write_config(
            r#"
[db]
path = "./data/simrec.sqlite"

[server]
bind = "127.0.0.1:8600"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.catalog.source, "database");
        assert_eq!(config.recommend.default_k, 5);
        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.refresh_interval_secs, 86_400);
    }

    #[test]
    fn test_csv_source_requires_path() {
        let file = write_config(
            r#"
[db]
path = "./data/simrec.sqlite"

[catalog]
source = "csv"

[server]
bind = "127.0.0.1:8600"
"#,
        );
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_invalid_df_bounds_rejected() {
        let file = write_config(
            r#"
[db]
path = "./data/simrec.sqlite"

[recommend]
min_df = 0.9
max_df = 0.1

[server]
bind = "127.0.0.1:8600"
"#,
        );
        assert!(load_config(file.path()).is_err());
    }
}
