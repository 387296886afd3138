//! Error types for function packaging.

use std::path::PathBuf;

use shipit_deps::DepsError;

pub type Result<T> = std::result::Result<T, PackError>;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Failed to find handler for '{dir}': expected '<name>.js' or 'index.js'")]
    MissingHandler { dir: PathBuf },

    #[error("Failed to resolve dependencies of '{function}': {source}")]
    Resolve {
        function: String,
        #[source]
        source: DepsError,
    },

    #[error("Functions directory '{0}' is not a directory")]
    InvalidSource(PathBuf),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to encode toolchain metadata: {0}")]
    Toolchain(#[from] serde_json::Error),

    #[error("Packaging task failed: {0}")]
    TaskFailed(String),

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
