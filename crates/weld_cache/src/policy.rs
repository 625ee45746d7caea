//! Cache pruning policy.

use weld_common::{ByteSize, MaxAge};

/// Bounds applied to the cache directory after a compile completes.
///
/// Pruning runs once per compile, after all tasks finish; it is never
/// applied mid-compile, and entries touched by the current compile are
/// exempt until the next compile's prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// Maximum total size of all entries, or `None` for unbounded.
    pub max_size: Option<ByteSize>,

    /// Maximum entry age, or `None` for unbounded.
    pub max_age: Option<MaxAge>,
}

impl CachePolicy {
    /// Returns `true` if the policy imposes no bounds, making pruning a
    /// no-op.
    pub fn is_unbounded(&self) -> bool {
        self.max_size.is_none() && self.max_age.is_none()
    }
}

/// Summary of one prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Number of entries deleted.
    pub removed: usize,

    /// Total bytes reclaimed by deletions.
    pub reclaimed_bytes: u64,

    /// Number of entries left in the cache.
    pub retained: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_unbounded() {
        assert!(CachePolicy::default().is_unbounded());
    }

    #[test]
    fn any_bound_makes_policy_bounded() {
        let by_size = CachePolicy {
            max_size: Some(ByteSize::new(1 << 30)),
            max_age: None,
        };
        assert!(!by_size.is_unbounded());

        let by_age = CachePolicy {
            max_size: None,
            max_age: Some(MaxAge::from_secs(86_400)),
        };
        assert!(!by_age.is_unbounded());
    }
}
