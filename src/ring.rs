//! Hash Ring Module
//!
//! Consistent hashing of keys onto a pool of member names.
//!
//! Each member is placed on the ring `replicas` times, at
//! `hash(i.to_string() + member)` for `i` in `0..replicas`. A key belongs to
//! the first point at or after its own hash, wrapping to the first point when
//! it hashes past the last one. Growing the pool therefore only moves keys
//! whose successor point now belongs to the new member.
//!
//! The ring is not synchronized. Build it first, then share it for reads.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// Hash function placing members and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// CRC-32 (IEEE), the default placement hash. Stable across processes.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// Consistent-hash ring with virtual replicas per member.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    /// Virtual nodes per member
    replicas: usize,
    /// Sorted, distinct ring points
    points: Vec<u32>,
    /// Ring point to owning member
    owners: HashMap<u32, String>,
    /// Members in the order they were first added
    members: Vec<String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring hashing with CRC-32.
    pub fn new(replicas: usize) -> Self {
        Self::with_hasher(replicas, crc32)
    }

    /// Creates an empty ring with a custom hash function.
    pub fn with_hasher(replicas: usize, hash: HashFn) -> Self {
        Self {
            hash,
            replicas,
            points: Vec::new(),
            owners: HashMap::new(),
            members: Vec::new(),
        }
    }

    // == Add ==
    /// Places members on the ring.
    ///
    /// Members already on the ring are skipped, so adding twice is a no-op.
    /// If two replicas hash to the same point, the one added last owns it.
    pub fn add<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for member in members {
            let member = member.into();
            if self.members.contains(&member) {
                debug!("Ring member {} already present, skipping", member);
                continue;
            }

            for i in 0..self.replicas {
                let point = (self.hash)(format!("{}{}", i, member).as_bytes());
                self.points.push(point);
                self.owners.insert(point, member.clone());
            }
            self.members.push(member);
        }

        self.points.sort_unstable();
        self.points.dedup();
    }

    // == Get ==
    /// Returns the member owning `key`, or `None` while the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.points.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.points.partition_point(|&point| point < hash);
        let point = self.points[idx % self.points.len()];
        self.owners.get(&point).map(String::as_str)
    }

    /// Members in insertion order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ring points in ascending order.
    pub fn points(&self) -> &[u32] {
        &self.points
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("members", &self.members)
            .field("points", &self.points.len())
            .finish()
    }
}
