//! Wache - A byte-bounded read-through cache
//!
//! Demo process: registers one group backed by an in-memory score table,
//! routes a few keys across the configured peers and reads them through the
//! cache twice.

use std::collections::HashMap;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wache::{Config, GroupRegistry, HashRing, LoaderFn};

/// Main entry point for the Wache demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the group with a slow-source loader
/// 4. Build the hash ring over the configured peers
/// 5. Read every key twice, logging the owning peer and cache stats
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: group={}, capacity={:?}, replicas={}, peers={}",
        config.group_name,
        config.capacity,
        config.replicas,
        config.peers.len()
    );

    let db: HashMap<&str, &str> = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
        .into_iter()
        .collect();

    let registry = GroupRegistry::new();
    let group = registry
        .builder(config.group_name.as_str())
        .capacity(config.capacity)
        .loader(LoaderFn::new(move |key: &str| {
            info!("[SlowDB] search key {}", key);
            match db.get(key) {
                Some(score) => Ok(score.as_bytes().to_vec()),
                None => anyhow::bail!("{} not exist", key),
            }
        }))
        .on_evict(|key, _| info!("Evicted {}", key))
        .register()
        .await?;

    let mut ring = HashRing::new(config.replicas);
    ring.add(config.peers.iter().cloned());

    for key in ["Tom", "Jack", "Sam", "Kate"] {
        let peer = ring.get(key).unwrap_or("<none>");
        for _ in 0..2 {
            match group.get(key).await {
                Ok(value) => info!("{} -> {} (owner {})", key, value, peer),
                Err(err) => warn!("{} failed: {} (owner {})", key, err, peer),
            }
        }
    }

    let stats = group.stats().await;
    info!(
        "Stats: hits={}, misses={}, loads={}, load_errors={}, entries={}, bytes={}, hit_rate={:.2}",
        stats.hits,
        stats.misses,
        stats.loads,
        stats.load_errors,
        stats.total_entries,
        stats.used_bytes,
        stats.hit_rate()
    );

    Ok(())
}
