//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Almost everything the cache does is fail-safe: unreadable entries are
/// misses and unwritable directories degrade the cache to disabled
/// behavior with a warning. The exception is [`CacheError::Conflict`],
/// which must abort the compile — it means the fingerprint derivation is
/// broken and any entry could be mismatched.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An existing entry under this fingerprint holds different bytes.
    ///
    /// Content-addressed storage relies on equal fingerprints implying
    /// equal content; a violation is an internal error, not a cache
    /// condition to recover from.
    #[error(
        "cache entry {fingerprint} at {path} holds different content; \
         task fingerprint derivation is defective"
    )]
    Conflict {
        /// The colliding fingerprint, in hex.
        fingerprint: String,
        /// The existing entry's path.
        path: PathBuf,
    },

    /// A serialization or deserialization error occurred.
    #[error("cache encoding error: {reason}")]
    Encoding {
        /// Description of the encoding failure.
        reason: String,
    },
}
