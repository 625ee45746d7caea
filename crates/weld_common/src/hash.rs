//! Content hashing for task fingerprints and cache keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit content hash computed using XXH3.
///
/// Two byte sequences with the same `ContentHash` are assumed to be
/// identical. Used as the task fingerprint and as the key of the
/// content-addressed object cache: a fingerprint collision implies
/// identical content, which is what makes concurrent cache access safe
/// without locking.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Returns the lowercase hex form, suitable as a cache filename stem.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Incremental XXH3-128 hasher for multi-field fingerprints.
///
/// Fields must be fed in a fixed, documented order; variable-length fields
/// are length-prefixed so that adjacent fields cannot alias each other
/// (`"ab" + "c"` hashes differently from `"a" + "bc"`).
pub struct ContentHasher {
    state: Xxh3,
}

impl ContentHasher {
    /// Creates a new hasher with an empty state.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds a fixed-width byte field.
    pub fn update_raw(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Feeds a variable-length byte field with a length prefix.
    pub fn update_bytes(&mut self, data: &[u8]) {
        self.state.update(&(data.len() as u64).to_le_bytes());
        self.state.update(data);
    }

    /// Feeds a string field with a length prefix.
    pub fn update_str(&mut self, s: &str) {
        self.update_bytes(s.as_bytes());
    }

    /// Feeds a `u64` field in little-endian encoding.
    pub fn update_u64(&mut self, v: u64) {
        self.state.update(&v.to_le_bytes());
    }

    /// Feeds a single byte, typically an enum discriminant or flag.
    pub fn update_u8(&mut self, v: u8) {
        self.state.update(&[v]);
    }

    /// Finishes hashing and returns the accumulated `ContentHash`.
    pub fn finish(self) -> ContentHash {
        ContentHash(self.state.digest128().to_le_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}
