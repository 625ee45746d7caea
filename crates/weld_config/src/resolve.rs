//! Resolution of parsed configuration into typed link options.

use std::path::PathBuf;

use weld_common::{ByteSize, MaxAge};
use weld_ir::TargetOptions;

use crate::error::ConfigError;
use crate::types::LinkConfig;

/// The effective, fully typed options driving one link.
///
/// Produced by [`LinkConfig::resolve`]; the CLI then overrides individual
/// fields from command-line flags before handing the options to the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Codegen job limit: 0 picks a default level of parallelism, 1 forces
    /// strictly sequential execution.
    pub jobs: usize,

    /// Cache directory; `None` disables caching.
    pub cache_dir: Option<PathBuf>,

    /// Maximum total cache size bound, if any.
    pub cache_max_size: Option<ByteSize>,

    /// Maximum cache entry age bound, if any.
    pub cache_max_age: Option<MaxAge>,

    /// Persist each task's object buffer for inspection.
    pub save_intermediates: bool,

    /// Target and optimization settings, passed opaquely to the engine.
    pub target: TargetOptions,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            jobs: 0,
            cache_dir: None,
            cache_max_size: None,
            cache_max_age: None,
            save_intermediates: false,
            target: TargetOptions::default(),
        }
    }
}

impl LinkConfig {
    /// Converts the parsed configuration into typed [`LinkOptions`],
    /// validating unit strings and the optimization level.
    pub fn resolve(&self) -> Result<LinkOptions, ConfigError> {
        let cache_max_size = self
            .cache
            .max_size
            .as_deref()
            .map(|s| {
                s.parse::<ByteSize>().map_err(|e| ConfigError::InvalidValue {
                    field: "cache.max_size".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let cache_max_age = self
            .cache
            .max_age
            .as_deref()
            .map(|s| {
                s.parse::<MaxAge>().map_err(|e| ConfigError::InvalidValue {
                    field: "cache.max_age".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        if self.target.opt_level > 3 {
            return Err(ConfigError::InvalidValue {
                field: "target.opt_level".to_string(),
                reason: format!("expected 0 through 3, got {}", self.target.opt_level),
            });
        }

        Ok(LinkOptions {
            jobs: self.link.jobs,
            cache_dir: self.cache.dir.clone(),
            cache_max_size,
            cache_max_age,
            save_intermediates: self.link.save_intermediates,
            target: TargetOptions {
                triple: self.target.triple.clone(),
                cpu: self.target.cpu.clone(),
                features: self.target.features.clone(),
                opt_level: self.target.opt_level,
            },
        })
    }
}
