//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use crate::cache::Capacity;

/// Default replica count for the hash ring.
pub const DEFAULT_REPLICAS: usize = 50;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the group served by the process
    pub group_name: String,
    /// Byte budget of the group cache
    pub capacity: Capacity,
    /// Virtual nodes per ring member
    pub replicas: usize,
    /// Ring members keys are routed to
    pub peers: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `WACHE_GROUP` - Group name (default: scores)
    /// - `WACHE_CACHE_BYTES` - Byte budget, zero or negative for unbounded (default: 2048)
    /// - `WACHE_REPLICAS` - Virtual nodes per member (default: 50)
    /// - `WACHE_PEERS` - Comma separated member names (default: three localhost peers)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            group_name: env::var("WACHE_GROUP")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.group_name),
            capacity: env::var("WACHE_CACHE_BYTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .map(Capacity::from_bytes)
                .unwrap_or(defaults.capacity),
            replicas: env::var("WACHE_REPLICAS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.replicas),
            peers: env::var("WACHE_PEERS")
                .ok()
                .map(|v| parse_peers(&v))
                .filter(|peers| !peers.is_empty())
                .unwrap_or(defaults.peers),
        }
    }
}

fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_name: "scores".to_string(),
            capacity: Capacity::Bounded(2048),
            replicas: DEFAULT_REPLICAS,
            peers: vec![
                "http://localhost:8001".to_string(),
                "http://localhost:8002".to_string(),
                "http://localhost:8003".to_string(),
            ],
        }
    }
}
