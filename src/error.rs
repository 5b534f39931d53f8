//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache groups and the group registry.
///
/// The eviction core and the hash ring never fail: a miss is an `Option`,
/// not an error.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// An empty key was passed to a group lookup
    #[error("key is required")]
    InvalidKey,

    /// The group's loader failed; the loader's message is kept as-is.
    ///
    /// Shared behind an `Arc` so every caller waiting on the same load
    /// observes the same error.
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// A group with this name is already registered
    #[error("group already registered: {0}")]
    DuplicateGroup(String),
}

impl CacheError {
    /// Wraps a loader failure.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_keeps_message() {
        let err = CacheError::loader(anyhow::anyhow!("Tom not exist"));
        assert_eq!(err.to_string(), "Tom not exist");
    }

    #[test]
    fn test_loader_error_clones_share_source() {
        let err = CacheError::loader(anyhow::anyhow!("boom"));
        let copy = err.clone();
        match (err, copy) {
            (CacheError::Loader(a), CacheError::Loader(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected loader errors"),
        }
    }

    #[test]
    fn test_invalid_key_message() {
        assert_eq!(CacheError::InvalidKey.to_string(), "key is required");
    }
}
