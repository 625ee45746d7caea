//! Partitioning the merged program into codegen tasks.

use weld_common::ContentHash;
use weld_ir::{ModuleId, TargetOptions, TaskId};
use weld_resolve::ResolvedProgram;

use crate::fingerprint::task_fingerprint;

/// One independently compilable unit of the merged program.
///
/// A task owns exactly one module's slice of the whole program together
/// with that module's resolution view; nothing a task needs at execution
/// time can change after planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPlan {
    /// Ordinal position in the output buffer list, 0-based, stable across
    /// runs for identical input.
    pub id: TaskId,

    /// The module whose slice this task generates code for.
    pub module: ModuleId,

    /// Content fingerprint of the task's assigned slice; the incremental
    /// cache key.
    pub fingerprint: ContentHash,

    /// `true` if the partition contains no prevailing definitions and will
    /// legitimately produce no output.
    pub is_empty: bool,
}

/// Splits the finalized program into one task per registered module.
///
/// The split follows registration order, so the task count and each task's
/// ordinal are a pure function of the input module set — identical across
/// runs and independent of the job limit the backend later runs with. A
/// module whose resolution view contains no prevailing definition becomes
/// an empty task: every copy it carried was demoted to an external
/// reference against some other partition.
pub fn plan(program: &ResolvedProgram, target: &TargetOptions) -> Vec<TaskPlan> {
    program
        .modules()
        .map(|(module_id, module)| {
            let resolutions = program.resolutions(module_id);
            TaskPlan {
                id: TaskId::from_raw(module_id.as_raw()),
                module: module_id,
                fingerprint: task_fingerprint(module, resolutions, target),
                is_empty: !resolutions.iter().any(|r| r.prevailing),
            }
        })
        .collect()
}
