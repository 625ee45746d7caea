//! Parallel task execution with cache integration.

use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use weld_cache::{CacheError, ObjectCache};
use weld_common::InternalError;
use weld_ir::TargetOptions;
use weld_plan::TaskPlan;
use weld_resolve::ResolvedProgram;

use crate::engine::{CodegenEngine, CodegenInput};

/// The result slot of one executed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSlot {
    /// The task's partition was empty; it legitimately produced no output.
    Empty,

    /// The engine generated this buffer during the current compile.
    Fresh(Vec<u8>),

    /// The buffer was served from the incremental cache; the engine was
    /// not invoked.
    Cached(Vec<u8>),
}

impl TaskSlot {
    /// Returns the object bytes, or `None` for an empty slot.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            TaskSlot::Empty => None,
            TaskSlot::Fresh(b) | TaskSlot::Cached(b) => Some(b),
        }
    }

    /// Returns `true` if the buffer came from the cache.
    pub fn is_cached(&self) -> bool {
        matches!(self, TaskSlot::Cached(_))
    }
}

/// A task plan together with its populated result slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    /// The plan this task executed.
    pub plan: TaskPlan,

    /// The task's result.
    pub slot: TaskSlot,
}

/// Errors that abort the whole compile.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The codegen engine failed for one task. Fatal: without this task's
    /// object the final link is impossible.
    #[error("codegen failed for task {task} (fingerprint {fingerprint}): {message}")]
    Codegen {
        /// Ordinal index of the failing task.
        task: usize,
        /// The failing task's fingerprint, in hex.
        fingerprint: String,
        /// The engine's failure message.
        message: String,
    },

    /// The cache detected a fingerprint collision with differing content.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The worker pool could not be constructed.
    #[error("failed to build codegen worker pool: {reason}")]
    Pool {
        /// Description of the pool construction failure.
        reason: String,
    },

    /// An internal invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

enum TaskOutcome {
    Done(CompletedTask),
    Skipped,
    Failed(BackendError),
}

/// Executes every planned task exactly once and populates its result slot.
///
/// `jobs = 0` selects rayon's default level of parallelism; `jobs = 1`
/// forces strictly sequential execution (for engines that cannot be
/// invoked concurrently); any other value caps the worker pool at that
/// size. Execution order across tasks is unspecified, but the returned
/// list is always in task-ordinal order.
///
/// Per task: an empty partition completes immediately with an empty slot;
/// otherwise the cache is consulted by fingerprint, and only on a miss is
/// the engine invoked, with the produced buffer offered back to the cache
/// before the task completes.
///
/// The first failure aborts the compile: not-yet-started tasks are skipped
/// via an abort flag, completed outputs are discarded, and the error names
/// the failing task. No partial result list is ever returned.
pub fn run_tasks(
    program: &ResolvedProgram,
    plans: &[TaskPlan],
    engine: &dyn CodegenEngine,
    cache: &ObjectCache,
    target: &TargetOptions,
    jobs: usize,
) -> Result<Vec<CompletedTask>, BackendError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| BackendError::Pool {
            reason: e.to_string(),
        })?;

    let abort = AtomicBool::new(false);
    let outcomes: Vec<TaskOutcome> = pool.install(|| {
        plans
            .par_iter()
            .map(|plan| {
                if abort.load(Ordering::Relaxed) {
                    return TaskOutcome::Skipped;
                }
                match execute_task(program, plan, engine, cache, target) {
                    Ok(done) => TaskOutcome::Done(done),
                    Err(err) => {
                        abort.store(true, Ordering::Relaxed);
                        TaskOutcome::Failed(err)
                    }
                }
            })
            .collect()
    });

    let mut completed = Vec::with_capacity(outcomes.len());
    let mut skipped = false;
    let mut failure = None;
    for outcome in outcomes {
        match outcome {
            TaskOutcome::Done(done) => completed.push(done),
            TaskOutcome::Skipped => skipped = true,
            // Keep the lowest-indexed failure so the report is
            // deterministic even when several tasks fail concurrently.
            TaskOutcome::Failed(err) => {
                if failure.is_none() {
                    failure = Some(err);
                }
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None if skipped => Err(InternalError::new(
            "tasks were skipped without a recorded failure",
        )
        .into()),
        None => Ok(completed),
    }
}

fn execute_task(
    program: &ResolvedProgram,
    plan: &TaskPlan,
    engine: &dyn CodegenEngine,
    cache: &ObjectCache,
    target: &TargetOptions,
) -> Result<CompletedTask, BackendError> {
    let task = plan.id.as_raw() as usize;

    if plan.is_empty {
        tracing::debug!(task, "empty partition, nothing to generate");
        return Ok(CompletedTask {
            plan: *plan,
            slot: TaskSlot::Empty,
        });
    }

    if let Some(bytes) = cache.lookup(&plan.fingerprint) {
        tracing::debug!(task, fingerprint = %plan.fingerprint, "cache hit");
        return Ok(CompletedTask {
            plan: *plan,
            slot: TaskSlot::Cached(bytes),
        });
    }

    let input = CodegenInput {
        task: plan.id,
        module: program.module(plan.module),
        resolutions: program.resolutions(plan.module),
        target,
    };
    let bytes = engine
        .generate(&input)
        .map_err(|e| BackendError::Codegen {
            task,
            fingerprint: plan.fingerprint.to_hex(),
            message: e.message,
        })?;
    tracing::debug!(task, bytes = bytes.len(), "generated object");

    cache.store(&plan.fingerprint, &bytes)?;
    Ok(CompletedTask {
        plan: *plan,
        slot: TaskSlot::Fresh(bytes),
    })
}
