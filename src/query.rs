//! CLI query commands: run one recommendation and print a ranked listing.

use anyhow::Result;

use simrec_core::models::ScoredItem;

use crate::config::Config;
use crate::engine::build_recommender;

pub async fn run_item(config: &Config, item_id: i64, k: Option<usize>) -> Result<()> {
    let recommender = build_recommender(config).await?;
    let k = k.unwrap_or(config.recommend.default_k);
    let results = recommender.recommend_for_item(item_id, k).await?;
    print_results(&results);
    Ok(())
}

pub async fn run_keywords(config: &Config, query: &str, k: Option<usize>) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }
    let recommender = build_recommender(config).await?;
    let k = k.unwrap_or(config.recommend.default_k);
    let results = recommender.recommend_for_keywords(query, k).await?;
    print_results(&results);
    Ok(())
}

pub async fn run_category(config: &Config, category_id: i64, k: Option<usize>) -> Result<()> {
    let recommender = build_recommender(config).await?;
    let k = k.unwrap_or(config.recommend.default_k);
    let results = recommender.recommend_for_category(category_id, k).await?;
    print_results(&results);
    Ok(())
}

pub async fn run_group(config: &Config, group_id: i64, k: Option<usize>) -> Result<()> {
    let recommender = build_recommender(config).await?;
    let k = k.unwrap_or(config.recommend.default_k);
    let results = recommender.recommend_for_group(group_id, k).await?;
    print_results(&results);
    Ok(())
}

fn print_results(results: &[ScoredItem]) {
    if results.is_empty() {
        println!("No results.");
        return;
    }

    for (rank, result) in results.iter().enumerate() {
        let item = &result.item;
        println!(
            "{}. {} (id {}, score {:.4})",
            rank + 1,
            item.name,
            item.id,
            result.similarity_score
        );
        if !item.group_name.is_empty() {
            println!("   group: {}", item.group_name);
        }
        if !item.origin.is_empty() {
            println!("   origin: {}", item.origin);
        }
    }
}
