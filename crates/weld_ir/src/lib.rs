//! Data model for the Weld LTO driver.
//!
//! Defines the input unit of a whole-program link ([`IrModule`] and its
//! [`SymbolDescriptor`]s), the opaque codegen settings ([`TargetOptions`])
//! that travel with every task, ID-indexed storage for registered modules,
//! and the `.wir` on-disk module container produced by front-ends.

#![warn(missing_docs)]

pub mod arena;
pub mod container;
pub mod ids;
pub mod module;
pub mod target;

pub use arena::{Arena, ArenaId};
pub use container::{read_module, write_module, ModuleFormatError};
pub use ids::{ModuleId, TaskId};
pub use module::{Definedness, IrModule, SymbolDescriptor};
pub use target::TargetOptions;
