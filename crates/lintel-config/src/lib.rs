//! Lintel Config - project configuration and policy path filtering
//!
//! Collects the policy files a command should look at: input paths are
//! walked for `.rego` files and then filtered through the ignore patterns
//! from `.lintel.toml` and the command line.

mod config;
mod error;
mod filter;

pub use config::{Config, IgnoreConfig, CONFIG_FILE_NAME};
pub use error::{ConfigError, Result, WalkErrors, WalkFailure};
pub use filter::{exclude_file, filter_ignored_paths, POLICY_EXTENSION, SKIPPED_DIRECTORIES};
