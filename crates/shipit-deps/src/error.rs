//! Error types for dependency resolution.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DepsError>;

/// Fatal failures of a dependency walk.
///
/// A missing package is only fatal once the optional and fallback lookups
/// have both been exhausted. Non-fatal misses are modelled by
/// [`crate::resolver::ModuleNotFound`] and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum DepsError {
    #[error("Entry file '{path}' does not exist")]
    EntryNotFound { path: PathBuf },

    #[error(
        "Could not find \"{module}\" module in file: '{importer}'. \
         Please ensure \"{module}\" is installed in the project"
    )]
    UnresolvedDependency { module: String, importer: PathBuf },

    #[error("Cannot resolve '{specifier}' imported from '{importer}'")]
    UnresolvedImport { specifier: String, importer: PathBuf },

    #[error("Invalid package.json at '{path}': {reason}")]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("Failed to list imports of '{path}': {reason}")]
    ImportListing { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DepsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Name of the module this error is about, when there is one.
    pub fn module(&self) -> Option<&str> {
        match self {
            Self::UnresolvedDependency { module, .. } => Some(module),
            Self::UnresolvedImport { specifier, .. } => Some(specifier),
            _ => None,
        }
    }
}
