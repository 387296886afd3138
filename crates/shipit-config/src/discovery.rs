//! File-based config discovery and layered loading
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `shipit.toml` in the project root (or an explicit file)
//! 3. the `shipit` field of the project's package.json
//! 4. `SHIPIT_`-prefixed environment variables, `__` separating sections
//!    (`SHIPIT_RESOLVE__TREE_SHAKE=true`)

use std::fs;
use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde_json::Value;

use crate::config::ShipitConfig;
use crate::error::{ConfigError, Result};

/// Conventional config file name.
pub const CONFIG_FILE: &str = "shipit.toml";

/// package.json field holding inline configuration.
pub const PACKAGE_JSON_FIELD: &str = "shipit";

const ENV_PREFIX: &str = "SHIPIT_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use shipit_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigDiscovery {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use `path` instead of looking for `shipit.toml`.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Config files that will be read, in merge order.
    pub fn find(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();

        match &self.explicit {
            Some(path) => found.push(path.clone()),
            None => {
                let toml_path = self.root.join(CONFIG_FILE);
                if toml_path.is_file() {
                    found.push(toml_path);
                }
            }
        }

        let pkg_path = self.root.join("package.json");
        if package_json_section(&pkg_path).is_some() {
            found.push(pkg_path);
        }

        found
    }

    /// Build the layered figment without extracting it.
    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(ShipitConfig::default()));

        match &self.explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.clone()));
                }
                check_toml_syntax(path)?;
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let toml_path = self.root.join(CONFIG_FILE);
                if toml_path.is_file() {
                    check_toml_syntax(&toml_path)?;
                    figment = figment.merge(Toml::file(toml_path));
                }
            }
        }

        if let Some(section) = package_json_section(&self.root.join("package.json")) {
            figment = figment.merge(Serialized::defaults(section));
        }

        let env = Env::prefixed(ENV_PREFIX).split("__").filter(|key| {
            let key = key.as_str();
            key.starts_with("resolve") || key.starts_with("package")
        });
        Ok(figment.merge(env))
    }

    /// Load, validate and rebase the configuration.
    ///
    /// Relative roots are resolved against the discovery root.
    pub fn load(&self) -> Result<ShipitConfig> {
        let config: ShipitConfig = self.figment()?.extract()?;
        config.validate()?;

        let sources = self.find();
        if sources.is_empty() {
            tracing::debug!("No config file found in {}, using defaults", self.root.display());
        } else {
            tracing::debug!(?sources, "Loaded configuration");
        }

        Ok(config.rebase(&self.root))
    }
}

/// Reject malformed TOML up front with the file named in the error.
fn check_toml_syntax(path: &Path) -> Result<()> {
    let content = fs::read_to_string(path)?;
    toml::from_str::<toml::Table>(&content).map_err(|e| ConfigError::InvalidValue {
        field: path.display().to_string(),
        hint: format!("invalid TOML syntax: {}", e.message()),
    })?;
    Ok(())
}

/// The non-null `shipit` field of a package.json, if any.
fn package_json_section(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    let parsed: Value = serde_json::from_str(&content).ok()?;
    parsed
        .get(PACKAGE_JSON_FIELD)
        .filter(|section| !section.is_null())
        .cloned()
}

/// Discover and load config from current directory (convenience function)
pub fn discover() -> Result<ShipitConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_returns_nothing_without_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_empty());
    }

    #[test]
    fn find_lists_toml_then_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[resolve]\ntree_shake = true\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name": "site", "shipit": {"package": {"compression_level": 9}}}"#,
        )
        .unwrap();

        let found = ConfigDiscovery::new(dir.path()).find();
        assert_eq!(
            found,
            vec![dir.path().join(CONFIG_FILE), dir.path().join("package.json")]
        );
    }

    #[test]
    fn package_json_without_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"name": "site"}"#).unwrap();
        assert!(ConfigDiscovery::new(dir.path()).find().is_empty());
    }

    #[test]
    fn malformed_toml_names_the_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "[resolve\ntree_shake = true\n").unwrap();

        let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
        match err {
            ConfigError::InvalidValue { field, hint } => {
                assert!(field.ends_with(CONFIG_FILE));
                assert!(hint.starts_with("invalid TOML syntax"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn explicit_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigDiscovery::new(dir.path())
            .with_file(&missing)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }
}
