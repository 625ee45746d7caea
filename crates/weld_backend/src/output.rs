//! Assembly of the ordered object list handed to the linker.

use std::path::Path;

use crate::runner::{CompletedTask, TaskSlot};

/// Collects the final object buffers in task-ordinal order.
///
/// A task with no output contributes nothing, whether its partition was
/// empty at planning time or the engine produced a zero-length buffer, so
/// the returned list may be shorter than the task list; the relative order
/// of the remaining buffers always matches their tasks' ordinals.
pub fn collect_objects(tasks: Vec<CompletedTask>) -> Vec<Vec<u8>> {
    tasks
        .into_iter()
        .filter_map(|t| match t.slot {
            TaskSlot::Empty => None,
            TaskSlot::Fresh(b) | TaskSlot::Cached(b) => (!b.is_empty()).then_some(b),
        })
        .collect()
}

/// Persists each non-empty task buffer to `<base>.lto.<index>.o` for
/// inspection.
///
/// Purely a debugging aid: failures are logged and swallowed so the
/// side effect can never influence the buffers handed to the linker.
pub fn save_intermediates(tasks: &[CompletedTask], base: &Path) {
    for task in tasks {
        let Some(bytes) = task.slot.bytes().filter(|b| !b.is_empty()) else {
            continue;
        };
        let path = base.with_file_name(format!(
            "{}.lto.{}.o",
            base.file_name().and_then(|n| n.to_str()).unwrap_or("weld"),
            task.plan.id.as_raw()
        ));
        if let Err(err) = std::fs::write(&path, bytes) {
            tracing::warn!("failed to save intermediate {}: {err}", path.display());
        }
    }
}
