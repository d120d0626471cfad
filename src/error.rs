//! Per-document error types and the build report.
//!
//! Failures split into two classes:
//! - [`ParseError`]: a single document is malformed. The document is
//!   skipped and recorded; the rest of the build continues.
//! - [`crate::config::ConfigError`]: configuration problems. Most abort
//!   the whole build; a missing layout only fails the documents using it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Recoverable parsing failures scoped to one document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error when reading `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unterminated front matter block in `{}`", .path.display())]
    UnterminatedFrontMatter { path: PathBuf },

    #[error("invalid front matter in `{}` at line {line}: {reason}", .path.display())]
    FrontMatter {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("unterminated code fence in `{}` (opened at line {line})", .path.display())]
    UnterminatedFence { path: PathBuf, line: usize },
}

impl ParseError {
    /// Source document the error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. }
            | Self::UnterminatedFrontMatter { path }
            | Self::FrontMatter { path, .. }
            | Self::UnterminatedFence { path, .. } => path,
        }
    }
}

/// A document excluded from the build, with the reason it was skipped.
#[derive(Debug)]
pub struct Skip {
    pub source: PathBuf,
    pub reason: String,
}

/// Accumulated outcome of a build run.
///
/// Per-document failures land here instead of stopping the build; the
/// builder logs the full list at the end and `--strict` turns a non-empty
/// skip list into a fatal error.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Number of documents written to the output directory.
    pub built: usize,
    /// Documents excluded from the build.
    pub skipped: Vec<Skip>,
}

impl BuildReport {
    pub fn skip(&mut self, source: PathBuf, reason: impl Into<String>) {
        self.skipped.push(Skip {
            source,
            reason: reason.into(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
