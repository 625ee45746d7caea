//! Configuration for the Weld LTO driver.
//!
//! Link settings live in an optional `weld.toml` next to the project (or
//! wherever `--config` points). The file is parsed into [`LinkConfig`],
//! then resolved into the typed [`LinkOptions`] the driver consumes;
//! command-line flags override resolved values field by field.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::LinkOptions;
pub use types::{CacheSection, LinkConfig, LinkSection, TargetSection};
