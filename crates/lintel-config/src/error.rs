//! Error types for configuration and path filtering

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to check for exclusion using pattern {pattern}: {source}")]
    PatternCompile {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("failed to filter paths:\n{0}")]
    Walk(WalkErrors),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// One path that could not be read while collecting policy files
#[derive(Debug, Error)]
#[error("{}: {source}", .path.display())]
pub struct WalkFailure {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Every failure from one walk, reported together
#[derive(Debug, Default)]
pub struct WalkErrors(pub Vec<WalkFailure>);

impl WalkErrors {
    pub fn push(&mut self, path: impl Into<PathBuf>, source: io::Error) {
        self.0.push(WalkFailure {
            path: path.into(),
            source,
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WalkFailure> {
        self.0.iter()
    }
}

impl fmt::Display for WalkErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
