//! Error types for the configuration store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or changing the stored configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("unable to determine home directory")]
    NoHomeDir,

    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// An alias must be non-empty.
    #[error("Alias is required")]
    EmptyAlias,

    /// The alias is already taken.
    #[error("Alias '{0}' already exists")]
    DuplicateAlias(String),

    /// No machine is stored under the alias.
    #[error("Alias '{0}' not found")]
    UnknownAlias(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
