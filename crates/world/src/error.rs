use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by configuration loading and saving.
#[derive(Debug, Error)]
pub enum WarpedError {
    /// Wrap IO errors when reading or writing config files.
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Wrap TOML parsing issues.
    #[error("failed to parse dimension config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Wrap TOML serialization issues.
    #[error("failed to serialize dimension config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// A value parsed but makes no sense.
    #[error("invalid dimension config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, WarpedError>;
