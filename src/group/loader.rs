//! Loader Module
//!
//! The data source a group falls back to on a cache miss.

use async_trait::async_trait;

// == Loader ==
/// Loads the bytes for a key when the cache does not hold them.
///
/// Implementations may compute locally, read from disk or call a remote
/// service. Any error is final: the group neither retries nor caches it.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Loader Fn ==
/// Adapts a plain synchronous function into a [`Loader`].
///
/// # Example
/// ```ignore
/// let loader = LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec()));
/// ```
pub struct LoaderFn<F>(F);

impl<F> LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}
