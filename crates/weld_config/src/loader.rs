//! Configuration file loading.

use crate::error::ConfigError;
use crate::types::LinkConfig;
use std::path::Path;

/// Loads a `weld.toml` configuration file.
///
/// A missing file is not an error: the link falls back to default options,
/// so projects without a config file still link. Any other I/O failure or
/// a parse failure is reported.
pub fn load_config(path: &Path) -> Result<LinkConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(LinkConfig::default());
        }
        Err(e) => return Err(ConfigError::IoError(e)),
    };
    load_config_from_str(&content)
}

/// Parses a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<LinkConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parse_empty_config() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.link.jobs, 0);
        assert!(config.cache.dir.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[link]
jobs = 4
save_intermediates = true

[cache]
dir = ".weld-cache"
max_size = "2G"
max_age = "14d"

[target]
triple = "x86_64-unknown-linux-gnu"
cpu = "skylake"
features = ["+avx2", "+fma"]
opt_level = 3
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.link.jobs, 4);
        assert!(config.link.save_intermediates);
        assert_eq!(config.cache.dir, Some(PathBuf::from(".weld-cache")));
        assert_eq!(config.cache.max_size.as_deref(), Some("2G"));
        assert_eq!(config.cache.max_age.as_deref(), Some("14d"));
        assert_eq!(config.target.triple, "x86_64-unknown-linux-gnu");
        assert_eq!(config.target.features.len(), 2);
        assert_eq!(config.target.opt_level, 3);
    }

    #[test]
    fn partial_sections_take_defaults() {
        let toml = r#"
[cache]
dir = "/var/cache/weld"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.link.jobs, 0);
        assert_eq!(config.cache.dir, Some(PathBuf::from("/var/cache/weld")));
        assert!(config.cache.max_size.is_none());
        assert_eq!(config.target.opt_level, 2);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/weld.toml")).unwrap();
        assert_eq!(config.link.jobs, 0);
    }

    #[test]
    fn existing_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weld.toml");
        std::fs::write(&path, "[link]\njobs = 2\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.link.jobs, 2);
    }
}
