//! Cache Entry Module
//!
//! Defines cache entries and the size capability used for byte accounting.

// == Value ==
/// Anything stored in an [`LruCache`](crate::cache::LruCache) must report its size in bytes.
pub trait Value {
    /// Bytes charged against the cache budget for this value.
    fn byte_len(&self) -> usize;
}

impl Value for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl Value for String {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

// == Cache Entry ==
/// A single key/value pair held by the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The lookup key
    pub key: String,
    /// The stored value
    pub value: V,
}

impl<V: Value> CacheEntry<V> {
    // == Constructor ==
    pub fn new(key: String, value: V) -> Self {
        Self { key, value }
    }

    // == Size ==
    /// Bytes this entry is charged: key length plus value length.
    pub fn size(&self) -> usize {
        self.key.len() + self.value.byte_len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_size_counts_key_and_value() {
        let entry = CacheEntry::new("key1".to_string(), "value1".to_string());
        assert_eq!(entry.size(), 10);
    }

    #[test]
    fn test_entry_size_empty_value() {
        let entry = CacheEntry::new("k".to_string(), Vec::<u8>::new());
        assert_eq!(entry.size(), 1);
    }
}
