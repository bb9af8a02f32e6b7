use anyhow::Result;

use crate::config::Config;
use crate::engine::build_recommender;

pub async fn run_train(config: &Config) -> Result<()> {
    let recommender = build_recommender(config).await?;

    println!("Training model from catalog source '{}'...", config.catalog.source);
    let snapshot = recommender.train().await?;

    println!(
        "Trained over {} items; snapshot saved to {}",
        snapshot.len(),
        config.model.path.display()
    );
    Ok(())
}
