//! `weld link` — the full link pipeline from `.wir` modules to objects.
//!
//! Chains the whole driver: load configuration, read and register every
//! input module, finalize symbol resolution, plan the partition, execute
//! codegen tasks against the incremental cache, write the ordered object
//! set, and finally prune the cache.

use std::collections::HashSet;
use std::path::PathBuf;

use weld_backend::{collect_objects, run_tasks, save_intermediates, TaskSlot};
use weld_cache::{CachePolicy, ObjectCache};
use weld_config::LinkOptions;
use weld_plan::plan;
use weld_resolve::ResolutionRegistry;

use crate::emit::IrObjectEngine;
use crate::{GlobalArgs, LinkArgs};

/// Runs the `weld link` command. Returns exit code 0 on success.
pub fn run(args: &LinkArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let options = resolve_options(args, global)?;

    // Register every module in command-line order; registration order is
    // the resolution tie-break, so it must match what the user wrote.
    let mut seen = HashSet::new();
    let mut registry = ResolutionRegistry::new();
    for path in &args.modules {
        let module = weld_ir::read_module(path)?;
        if !seen.insert(module.name.clone()) {
            return Err(format!(
                "duplicate module identity '{}' (from {})",
                module.name,
                path.display()
            )
            .into());
        }
        registry.register(module)?;
    }

    if !global.quiet {
        eprintln!("   Linking {} module(s)", registry.module_count());
    }

    let program = registry.finalize();
    let plans = plan(&program, &options.target);

    let cache = match &options.cache_dir {
        Some(dir) => ObjectCache::at_dir(dir),
        None => ObjectCache::disabled(),
    };

    let tasks = run_tasks(
        &program,
        &plans,
        &IrObjectEngine,
        &cache,
        &options.target,
        options.jobs,
    )?;

    if options.save_intermediates {
        save_intermediates(&tasks, &args.output);
    }

    let cached = tasks.iter().filter(|t| t.slot.is_cached()).count();
    let generated = tasks
        .iter()
        .filter(|t| matches!(t.slot, TaskSlot::Fresh(_)))
        .count();
    let empty = tasks.len() - cached - generated;

    let buffers = collect_objects(tasks);
    for (index, buffer) in buffers.iter().enumerate() {
        let path = output_path(&args.output, index);
        std::fs::write(&path, buffer)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }

    let pruned = cache.prune(&CachePolicy {
        max_size: options.cache_max_size,
        max_age: options.cache_max_age,
    });

    if !global.quiet {
        eprintln!(
            "    Linked {} object(s) ({generated} generated, {cached} cached, {empty} empty)",
            buffers.len()
        );
        if pruned.removed > 0 {
            eprintln!(
                "    Pruned {} cache entr{} ({} bytes)",
                pruned.removed,
                if pruned.removed == 1 { "y" } else { "ies" },
                pruned.reclaimed_bytes
            );
        }
    }

    Ok(0)
}

/// Resolves effective link options: `weld.toml` first, CLI flags override.
fn resolve_options(
    args: &LinkArgs,
    global: &GlobalArgs,
) -> Result<LinkOptions, Box<dyn std::error::Error>> {
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("weld.toml"));
    let config = weld_config::load_config(&config_path)?;
    let mut options = config.resolve()?;

    if let Some(jobs) = args.jobs {
        options.jobs = jobs;
    }
    if let Some(dir) = &args.cache_dir {
        options.cache_dir = Some(dir.clone());
    }
    if args.no_cache {
        options.cache_dir = None;
    }
    if args.save_temps {
        options.save_intermediates = true;
    }
    if let Some(opt_level) = args.opt_level {
        if opt_level > 3 {
            return Err(format!("invalid optimization level {opt_level} (expected 0-3)").into());
        }
        options.target.opt_level = opt_level;
    }

    Ok(options)
}

/// Returns the path of the `index`-th final object: `<output>.<index>.o`.
fn output_path(output: &std::path::Path, index: usize) -> PathBuf {
    output.with_file_name(format!(
        "{}.{index}.o",
        output
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("weld.out")
    ))
}
