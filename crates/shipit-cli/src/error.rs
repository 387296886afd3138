//! Error handling for the shipit CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`; `main`
//! turns the final error into a `miette` report with an optional hint.

mod report;

use std::path::PathBuf;
use thiserror::Error;

use shipit_bundler::PackError;
use shipit_config::ConfigError;
use shipit_deps::DepsError;

pub use report::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A batch-level packaging failure
    #[error(transparent)]
    Pack(#[from] PackError),

    /// Dependency resolution failed
    #[error(transparent)]
    Resolve(#[from] DepsError),

    /// Some functions could not be packaged; each was reported already
    #[error("{failed} of {total} functions failed to package")]
    FunctionsFailed { failed: usize, total: usize },

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

impl CliError {
    /// Actionable advice shown below the error, when there is any.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Resolve(err) => deps_hint(err),
            Self::Pack(err) => pack_hint(err),
            Self::Config(ConfigError::NotFound(_)) => {
                Some("Check the path given to --config".to_string())
            }
            Self::Config(_) => Some(
                "Check shipit.toml, the \"shipit\" field of package.json and SHIPIT_* variables"
                    .to_string(),
            ),
            Self::FunctionsFailed { .. } => {
                Some("Fix the functions listed above and run the command again".to_string())
            }
            Self::FileNotFound(_) | Self::Io(_) | Self::Json(_) => None,
        }
    }
}

/// Hint for a failed function, shown next to its error.
pub fn pack_hint(err: &PackError) -> Option<String> {
    match err {
        PackError::MissingHandler { dir } => {
            let name = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "<name>".to_string());
            Some(format!("Add {name}.js or index.js to the function directory"))
        }
        PackError::Resolve { source, .. } => deps_hint(source),
        PackError::InvalidSource(_) => {
            Some("The first argument must be the directory holding your functions".to_string())
        }
        _ => None,
    }
}

fn deps_hint(err: &DepsError) -> Option<String> {
    match err {
        DepsError::UnresolvedDependency { module, .. } => Some(format!(
            "Run `npm install {module}`, or list it under optionalDependencies if it may be absent"
        )),
        DepsError::UnresolvedImport { .. } => {
            Some("Relative imports must name an existing file or directory".to_string())
        }
        DepsError::InvalidManifest { .. } => Some("Fix the JSON syntax of the manifest".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_library_errors() {
        let err: CliError = ConfigError::NotFound(PathBuf::from("ci.toml")).into();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("ci.toml"));

        let err: CliError = PackError::InvalidSource(PathBuf::from("functions")).into();
        assert!(matches!(err, CliError::Pack(_)));
    }

    #[test]
    fn unresolved_dependency_hint_names_module() {
        let err: CliError = DepsError::UnresolvedDependency {
            module: "left-pad".to_string(),
            importer: PathBuf::from("functions/hello.js"),
        }
        .into();
        let hint = err.hint().unwrap();
        assert!(hint.contains("npm install left-pad"));
        assert!(err.to_string().contains("\"left-pad\""));
    }

    #[test]
    fn missing_handler_hint_names_files() {
        let err = PackError::MissingHandler {
            dir: PathBuf::from("functions/hello"),
        };
        assert_eq!(
            pack_hint(&err).unwrap(),
            "Add hello.js or index.js to the function directory"
        );
    }

    #[test]
    fn functions_failed_message() {
        let err = CliError::FunctionsFailed { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 functions failed to package");
    }
}
