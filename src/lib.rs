//! Wache - A byte-bounded read-through cache
//!
//! Provides named cache groups with LRU eviction, single-flight loading on
//! misses, and a consistent-hash ring for routing keys to cache nodes.

pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod ring;

pub use cache::{ByteView, Capacity};
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Group, GroupRegistry, Loader, LoaderFn};
pub use ring::HashRing;
