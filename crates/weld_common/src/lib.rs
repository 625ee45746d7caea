//! Shared foundational types for the Weld LTO driver.
//!
//! This crate provides core types including interned symbol identifiers,
//! content hashing for fingerprints and cache keys, human-readable byte-size
//! and age parsing for cache policies, and common result types.

#![warn(missing_docs)]

pub mod age;
pub mod hash;
pub mod ident;
pub mod result;
pub mod size;

pub use age::{MaxAge, ParseMaxAgeError};
pub use hash::{ContentHash, ContentHasher};
pub use ident::{Ident, Interner};
pub use result::{InternalError, WeldResult};
pub use size::{ByteSize, ParseByteSizeError};
