//! Codegen settings that travel opaquely with every task.

use serde::{Deserialize, Serialize};

/// Target and optimization settings passed through to the codegen engine.
///
/// The driver never interprets these beyond feeding them into task
/// fingerprints: two builds with different target options must never share
/// cached objects, even for identical IR.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TargetOptions {
    /// Target triple, e.g. "x86_64-unknown-linux-gnu".
    pub triple: String,

    /// Target CPU name, empty for the engine's default.
    #[serde(default)]
    pub cpu: String,

    /// Additional target feature strings, e.g. "+avx2".
    #[serde(default)]
    pub features: Vec<String>,

    /// Optimization level, 0 through 3.
    #[serde(default = "default_opt_level")]
    pub opt_level: u8,
}

fn default_opt_level() -> u8 {
    2
}

impl Default for TargetOptions {
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
    fn default_opt_level_is_two() {
        assert_eq!(TargetOptions::default().opt_level, 2);
    }

    #[test]
    fn serde_roundtrip() {
        let opts = TargetOptions {
            triple: "x86_64-unknown-linux-gnu".to_string(),
            cpu: "skylake".to_string(),
            features: vec!["+avx2".to_string()],
            opt_level: 3,
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: TargetOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, back);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let opts: TargetOptions = serde_json::from_str(r#"{"triple":"aarch64-apple-darwin"}"#).unwrap();
        assert_eq!(opts.triple, "aarch64-apple-darwin");
        assert!(opts.cpu.is_empty());
        assert!(opts.features.is_empty());
        assert_eq!(opts.opt_level, 2);
    }
}
