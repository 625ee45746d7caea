//! Symbol resolution for whole-program linking.
//!
//! Every input module is registered with a [`ResolutionRegistry`], which
//! decides, per global symbol name, which module's definition prevails
//! across the merged program. Registration order is the tie-break: the
//! first module to offer a non-undefined definition wins, and every other
//! module's copy is demoted to an external reference against it.
//! Finalizing the registry produces a read-only [`ResolvedProgram`] that
//! the partition planner and codegen backend consume.

#![warn(missing_docs)]

pub mod registry;
pub mod resolution;

pub use registry::ResolutionRegistry;
pub use resolution::{ResolutionRecord, ResolvedProgram, SymbolResolution};
