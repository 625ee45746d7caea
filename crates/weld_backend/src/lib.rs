//! Task execution backend for whole-program codegen.
//!
//! Executes planned codegen tasks on a fixed-size worker pool, consulting
//! the incremental object cache before invoking the external codegen
//! engine, and assembles the ordered object buffer list handed to the
//! linker. The engine itself is an opaque [`CodegenEngine`] capability so
//! the whole pipeline is testable with a stub.

#![warn(missing_docs)]

pub mod engine;
pub mod output;
pub mod runner;

pub use engine::{CodegenEngine, CodegenInput, EngineError};
pub use output::{collect_objects, save_intermediates};
pub use runner::{run_tasks, BackendError, CompletedTask, TaskSlot};
