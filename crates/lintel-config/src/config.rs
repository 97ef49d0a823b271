//! `.lintel.toml` project configuration

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Name of the config file looked up from the working directory upwards
pub const CONFIG_FILE_NAME: &str = ".lintel.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// `[ignore]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    /// `.gitignore`-style patterns of files to skip
    #[serde(default)]
    pub files: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        contents.parse()
    }

    /// Nearest config file in `start` or one of its ancestors
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Patterns from the file followed by `extra` (e.g. from the command line)
    pub fn ignore_patterns(&self, extra: &[String]) -> Vec<String> {
        self.ignore
            .files
            .iter()
            .chain(extra)
            .cloned()
            .collect()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignore_files() {
        let config: Config = r#"
[ignore]
files = ["vendor/", "*_test.rego"]
"#
        .parse()
        .unwrap();

        assert_eq!(config.ignore.files, vec!["vendor/", "*_test.rego"]);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_config() {
        let err = "[ignore]\nfiles = 3\n".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_cli_patterns_follow_file_patterns() {
        let config = Config {
            ignore: IgnoreConfig {
                files: vec!["a/".to_string()],
            },
        };

        assert_eq!(
            config.ignore_patterns(&["b.rego".to_string()]),
            vec!["a/".to_string(), "b.rego".to_string()]
        );
    }
}
