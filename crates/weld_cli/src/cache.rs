//! `weld cache` — out-of-band maintenance of the incremental object cache.

use std::path::{Path, PathBuf};

use weld_cache::{CachePolicy, ObjectCache};
use weld_common::{ByteSize, MaxAge};
use weld_config::LinkOptions;

use crate::{CacheArgs, CacheCommand, GlobalArgs};

/// Runs the `weld cache` command. Returns exit code 0 on success.
pub fn run(args: &CacheArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("weld.toml"));
    let options = weld_config::load_config(&config_path)?.resolve()?;

    let dir = args
        .dir
        .clone()
        .or_else(|| options.cache_dir.clone())
        .ok_or("no cache directory configured (set [cache].dir or pass --dir)")?;

    match &args.command {
        CacheCommand::Stats => stats(&dir),
        CacheCommand::Prune { max_size, max_age } => {
            prune(&dir, &options, max_size.as_deref(), max_age.as_deref())
        }
        CacheCommand::Clear => clear(&dir),
    }
}

fn stats(dir: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let mut entries = 0usize;
    let mut total: u64 = 0;
    for entry in read_entries(dir)? {
        entries += 1;
        total += entry.metadata()?.len();
    }
    println!(
        "{entries} entr{} in {} ({total} bytes)",
        if entries == 1 { "y" } else { "ies" },
        dir.display()
    );
    Ok(0)
}

fn prune(
    dir: &Path,
    options: &LinkOptions,
    max_size: Option<&str>,
    max_age: Option<&str>,
) -> Result<i32, Box<dyn std::error::Error>> {
    let max_size = match max_size {
        Some(s) => Some(s.parse::<ByteSize>()?),
        None => options.cache_max_size,
    };
    let max_age = match max_age {
        Some(s) => Some(s.parse::<MaxAge>()?),
        None => options.cache_max_age,
    };

    let policy = CachePolicy { max_size, max_age };
    if policy.is_unbounded() {
        return Err("no pruning bounds configured (set cache.max_size/max_age \
                    or pass --max-size/--max-age)"
            .into());
    }

    let stats = ObjectCache::at_dir(dir).prune(&policy);
    println!(
        "removed {} entr{} ({} bytes), {} retained",
        stats.removed,
        if stats.removed == 1 { "y" } else { "ies" },
        stats.reclaimed_bytes,
        stats.retained
    );
    Ok(0)
}

fn clear(dir: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let mut removed = 0usize;
    for entry in read_entries(dir)? {
        std::fs::remove_file(entry.path())?;
        removed += 1;
    }
    println!(
        "removed {removed} entr{}",
        if removed == 1 { "y" } else { "ies" }
    );
    Ok(0)
}

/// Lists cache entry files (`*.o`) in the directory; a missing directory
/// yields an empty list.
fn read_entries(dir: &Path) -> Result<Vec<std::fs::DirEntry>, Box<dyn std::error::Error>> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(format!("cannot read {}: {e}", dir.display()).into()),
    };
    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry?;
        if entry.path().extension().and_then(|e| e.to_str()) == Some("o") {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weld_common::ContentHash;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            // Point at a path that never exists so tests are independent
            // of the working directory.
            config: Some(PathBuf::from("/nonexistent/weld.toml")),
        }
    }

    fn populate(dir: &Path, n: usize) {
        let cache = ObjectCache::at_dir(dir);
        for i in 0..n {
            let key = ContentHash::from_bytes(format!("task-{i}").as_bytes());
            cache.store(&key, format!("object {i}").as_bytes()).unwrap();
        }
    }

    #[test]
    fn stats_counts_entries() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 3);

        let args = CacheArgs {
            dir: Some(dir.path().to_path_buf()),
            command: CacheCommand::Stats,
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
    }

    #[test]
    fn clear_removes_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 3);

        let args = CacheArgs {
            dir: Some(dir.path().to_path_buf()),
            command: CacheCommand::Clear,
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().filter_map(Result::ok).count(),
            0
        );
    }

    #[test]
    fn prune_applies_flag_policy() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 2);
        std::thread::sleep(std::time::Duration::from_millis(20));

        let args = CacheArgs {
            dir: Some(dir.path().to_path_buf()),
            command: CacheCommand::Prune {
                max_size: None,
                max_age: Some("0s".to_string()),
            },
        };
        assert_eq!(run(&args, &global()).unwrap(), 0);
        assert_eq!(
            std::fs::read_dir(dir.path()).unwrap().filter_map(Result::ok).count(),
            0
        );
    }

    #[test]
    fn prune_without_bounds_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = CacheArgs {
            dir: Some(dir.path().to_path_buf()),
            command: CacheCommand::Prune {
                max_size: None,
                max_age: None,
            },
        };
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("no pruning bounds"));
    }

    #[test]
    fn missing_cache_dir_configuration_is_rejected() {
        let args = CacheArgs {
            dir: None,
            command: CacheCommand::Stats,
        };
        let err = run(&args, &global()).unwrap_err();
        assert!(err.to_string().contains("no cache directory configured"));
    }
}
