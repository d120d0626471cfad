//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
///
/// Everything here is structural except [`ConfigError::LayoutNotFound`],
/// which only fails the documents referencing the missing layout.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),

    #[error("layout `{0}` not found")]
    LayoutNotFound(String),

    #[error("layout cycle detected: {}", .0.join(" -> "))]
    LayoutCycle(Vec<String>),
}

impl ConfigError {
    /// Whether this error must abort the whole build.
    ///
    /// A missing layout is scoped to the documents that name it; every
    /// other variant is a structural misconfiguration.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::LayoutNotFound(_))
    }
}
