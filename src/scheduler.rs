//! Periodic model refresh.
//!
//! The server keeps serving the previous snapshot while a refresh runs, and
//! a failed refresh never tears down the process. Consecutive failures back
//! off exponentially, capped, before the regular interval resumes.

use std::sync::Arc;
use std::time::Duration;

use simrec_core::Recommender;

use crate::config::SchedulerConfig;

/// Spawns the background refresh task.
///
/// Trains once immediately (a failure is logged and the server starts
/// anyway, serving the persisted snapshot if one exists), then retrains
/// every `refresh_interval_secs`. After a failure the next attempt comes
/// after `retry_backoff_secs * 2^(failures-1)`, capped at 32x.
pub fn spawn_refresh_task(recommender: Arc<Recommender>, config: &SchedulerConfig) {
    let interval = Duration::from_secs(config.refresh_interval_secs);
    let base_backoff = Duration::from_secs(config.retry_backoff_secs);

    tokio::spawn(async move {
        match recommender.train().await {
            Ok(snapshot) => {
                println!("Initial model training complete ({} items)", snapshot.len());
            }
            Err(err) => {
                eprintln!("warning: initial model training failed: {err}");
            }
        }

        let mut failures: u32 = 0;
        loop {
            let delay = if failures == 0 {
                interval
            } else {
                base_backoff * (1 << (failures - 1).min(5))
            };
            tokio::time::sleep(delay).await;

            match recommender.refresh().await {
                Ok(snapshot) => {
                    if failures > 0 {
                        println!(
                            "Model refresh recovered after {} failed attempt(s)",
                            failures
                        );
                    }
                    failures = 0;
                    println!("Model refreshed ({} items)", snapshot.len());
                }
                Err(err) => {
                    failures += 1;
                    eprintln!(
                        "warning: model refresh failed (attempt {}): {err}",
                        failures
                    );
                }
            }
        }
    });
}
