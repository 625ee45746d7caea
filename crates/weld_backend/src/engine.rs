//! The opaque codegen engine boundary.

use weld_ir::{IrModule, TargetOptions, TaskId};
use weld_resolve::SymbolResolution;

/// Everything one codegen task needs, self-contained from planning time.
///
/// Tasks never observe each other's state: the module slice, its
/// resolution view, and the target settings are fixed before any task
/// starts.
pub struct CodegenInput<'a> {
    /// The task's ordinal identity, for diagnostics.
    pub task: TaskId,

    /// The module slice assigned to this task.
    pub module: &'a IrModule,

    /// Resolution decisions aligned with the module's descriptor order.
    pub resolutions: &'a [SymbolResolution],

    /// Target and optimization settings, opaque to the driver.
    pub target: &'a TargetOptions,
}

/// A failure reported by the codegen engine.
///
/// Any engine failure is fatal to the whole compile: a missing object
/// makes the final link impossible, so there is no per-task recovery.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    /// The engine's description of the failure.
    pub message: String,
}

impl EngineError {
    /// Creates an engine error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The module-level optimizer/codegen service, invoked once per task.
///
/// Implementations take a task's IR slice plus its resolution view and
/// return a native object buffer (possibly empty) or an error. They must
/// be callable from multiple worker threads at once; an engine that cannot
/// run concurrently is driven with a job limit of 1 instead.
pub trait CodegenEngine: Sync {
    /// Generates the native object for one task.
    fn generate(&self, input: &CodegenInput<'_>) -> Result<Vec<u8>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_display() {
        let err = EngineError::new("instruction selection failed for 'f'");
        assert_eq!(format!("{err}"), "instruction selection failed for 'f'");
    }
}
