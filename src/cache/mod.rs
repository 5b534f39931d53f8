//! Cache Module
//!
//! Provides the byte-bounded LRU cache and the values it stores.

mod byteview;
mod entry;
mod lru;
mod stats;


// Re-export public types
pub use byteview::ByteView;
pub use entry::{CacheEntry, Value};
pub use lru::{LruCache, OnEvict};
pub use stats::CacheStats;

// == Capacity ==
/// Byte budget of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Evict least recently used entries once more than this many bytes are held
    Bounded(usize),
    /// Never evict
    Unbounded,
}

impl Capacity {
    /// Interprets a signed byte count: zero or negative means unbounded.
    pub fn from_bytes(bytes: i64) -> Self {
        if bytes <= 0 {
            Capacity::Unbounded
        } else {
            Capacity::Bounded(usize::try_from(bytes).unwrap_or(usize::MAX))
        }
    }

    /// True when holding `used` bytes breaks the budget.
    pub fn is_exceeded_by(&self, used: usize) -> bool {
        match self {
            Capacity::Bounded(max) => used > *max,
            Capacity::Unbounded => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_from_bytes() {
        assert_eq!(Capacity::from_bytes(1024), Capacity::Bounded(1024));
        assert_eq!(Capacity::from_bytes(0), Capacity::Unbounded);
        assert_eq!(Capacity::from_bytes(-5), Capacity::Unbounded);
    }

    #[test]
    fn test_capacity_is_exceeded_by() {
        assert!(!Capacity::Bounded(10).is_exceeded_by(10));
        assert!(Capacity::Bounded(10).is_exceeded_by(11));
        assert!(!Capacity::Unbounded.is_exceeded_by(usize::MAX));
    }
}
