//! Configuration types deserialized from `weld.toml`.

use serde::Deserialize;
use std::path::PathBuf;

/// The top-level link configuration parsed from `weld.toml`.
///
/// Every section is optional; an absent file behaves exactly like an empty
/// one. Size and age bounds are kept as strings here and converted to
/// typed values during [resolution](crate::resolve).
#[derive(Debug, Default, Deserialize)]
pub struct LinkConfig {
    /// Link driver settings (parallelism, intermediate output).
    #[serde(default)]
    pub link: LinkSection,

    /// Incremental object cache settings.
    #[serde(default)]
    pub cache: CacheSection,

    /// Target and optimization settings passed to the codegen engine.
    #[serde(default)]
    pub target: TargetSection,
}

/// The `[link]` section.
#[derive(Debug, Deserialize)]
pub struct LinkSection {
    /// Codegen job limit: 0 picks a default level of parallelism, 1 forces
    /// strictly sequential execution.
    #[serde(default)]
    pub jobs: usize,

    /// Persist each task's object buffer next to the output for inspection.
    #[serde(default)]
    pub save_intermediates: bool,
}

impl Default for LinkSection {
    fn default() -> Self {
        Self {
            jobs: 0,
            save_intermediates: false,
        }
    }
}

/// The `[cache]` section. An absent `dir` disables caching entirely.
#[derive(Debug, Default, Deserialize)]
pub struct CacheSection {
    /// Cache directory; caching is disabled when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Maximum total cache size, e.g. "2G", "512M".
    #[serde(default)]
    pub max_size: Option<String>,

    /// Maximum cache entry age, e.g. "14d", "12h".
    #[serde(default)]
    pub max_age: Option<String>,
}

/// The `[target]` section, passed opaquely to the codegen engine.
#[derive(Debug, Deserialize)]
pub struct TargetSection {
    /// Target triple, e.g. "x86_64-unknown-linux-gnu".
    #[serde(default)]
    pub triple: String,

    /// Target CPU name, empty for the engine default.
    #[serde(default)]
    pub cpu: String,

    /// Additional target feature strings.
    #[serde(default)]
    pub features: Vec<String>,

    /// Optimization level, 0 through 3.
    #[serde(default = "default_opt_level")]
    pub opt_level: u8,
}

fn default_opt_level() -> u8 {
    2
}

impl Default for TargetSection {
    fn default() -> Self {
        Self {
            triple: String::new(),
            cpu: String::new(),
            features: Vec::new(),
            opt_level: default_opt_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.link.jobs, 0);
        assert!(!config.link.save_intermediates);
        assert!(config.cache.dir.is_none());
        assert!(config.cache.max_size.is_none());
        assert_eq!(config.target.opt_level, 2);
    }
}
