//! Incremental native-object cache for whole-program codegen.
//!
//! Generated objects are stored content-addressed: one file per task
//! fingerprint, no index. A fingerprint collision implies identical
//! content, so concurrent lookups and stores across processes need no
//! locking — entries are immutable once stored and only ever deleted, never
//! mutated in place. All reads are fail-safe: corruption or version
//! mismatches surface as cache misses, never as errors. Caching is a
//! performance optimization; the only fatal condition is a fingerprint
//! colliding with different content, which indicates a fingerprint
//! derivation defect upstream.

#![warn(missing_docs)]

pub mod error;
pub mod policy;
pub mod store;

pub use error::CacheError;
pub use policy::{CachePolicy, PruneStats};
pub use store::ObjectCache;
