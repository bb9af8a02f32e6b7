//! # simrec
//!
//! A content-based catalog recommendation service. Items are turned into
//! synthetic text documents (name, description, price bucket, group, city,
//! star and category tags, keywords), vectorized with TF-IDF over unigrams
//! and bigrams, and ranked by cosine similarity.
//!
//! The engine itself lives in the `simrec-core` crate; this crate supplies
//! the catalog backends (SQLite, CSV), on-disk model persistence, the HTTP
//! API, the refresh scheduler, and the `simrec` CLI.

pub mod catalog_csv;
pub mod catalog_db;
pub mod config;
pub mod db;
pub mod engine;
pub mod migrate;
pub mod model_file;
pub mod query;
pub mod scheduler;
pub mod server;
pub mod train;
