//! Opaque ID newtypes for link-time entities.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`. Module IDs are created by
//! [`Arena::alloc`](crate::arena::Arena::alloc) in registration order, so
//! they double as a stable, deterministic ordering of the input set.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a registered input module.
    ///
    /// Assigned in registration order; the ordering is part of the
    /// first-registered-wins resolution contract.
    ModuleId
);

define_id!(
    /// Opaque, copyable ID for a codegen task produced by partitioning.
    ///
    /// Task IDs are the ordinal positions of the output buffer list handed
    /// to the linker, stable across runs for identical input.
    TaskId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = ModuleId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
    }

    #[test]
    fn ids_are_hashable() {
        let mut set = HashSet::new();
        set.insert(TaskId::from_raw(0));
        set.insert(TaskId::from_raw(1));
        set.insert(TaskId::from_raw(0));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn ordering_follows_raw_index() {
        assert!(ModuleId::from_raw(0) < ModuleId::from_raw(1));
        assert!(TaskId::from_raw(3) > TaskId::from_raw(2));
    }

    #[test]
    fn serde_roundtrip() {
        let id = TaskId::from_raw(12);
        let json = serde_json::to_string(&id).unwrap();
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
