//! Byte View Module
//!
//! Immutable byte blob handed out by cache groups.

use std::fmt;
use std::sync::Arc;

use crate::cache::Value;

// == Byte View ==
/// Read-only view over a byte sequence.
///
/// The bytes are copied once on construction and shared afterwards, so
/// cloning a view never copies and no caller can mutate what the cache holds.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view holding its own copy of `bytes`.
    pub fn copy_from(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrows the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns a fresh, caller-owned copy of the bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl Default for ByteView {
    fn default() -> Self {
        Self::copy_from(&[])
    }
}

impl Value for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::copy_from(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteView({:?})", String::from_utf8_lossy(&self.bytes))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_from_does_not_alias_source() {
        let mut source = b"630".to_vec();
        let view = ByteView::copy_from(&source);

        source[0] = b'9';

        assert_eq!(view.as_slice(), b"630");
    }

    #[test]
    fn test_to_vec_returns_independent_copy() {
        let view = ByteView::from("589");
        let mut copy = view.to_vec();
        copy.push(b'!');

        assert_eq!(view.len(), 3);
        assert_eq!(view.to_string(), "589");
    }

    #[test]
    fn test_clone_shares_bytes() {
        let view = ByteView::from("567");
        let clone = view.clone();

        assert_eq!(view, clone);
        assert_eq!(view.as_slice().as_ptr(), clone.as_slice().as_ptr());
    }

    #[test]
    fn test_byte_len_matches_len() {
        let view = ByteView::from("hello");
        assert_eq!(view.byte_len(), 5);
        assert!(!view.is_empty());
        assert!(ByteView::default().is_empty());
    }
}
