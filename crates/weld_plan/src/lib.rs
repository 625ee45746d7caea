//! Whole-program merge planning: partitioning and task fingerprints.
//!
//! Once resolution is finalized, [`plan`] splits the merged program into
//! independently compilable tasks. The task count and ordering are a pure
//! function of the input — never of available hardware — and every task
//! carries a content fingerprint derived only from the semantic content
//! assigned to it, which doubles as its incremental-cache key.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod partition;

pub use fingerprint::task_fingerprint;
pub use partition::{plan, TaskPlan};
