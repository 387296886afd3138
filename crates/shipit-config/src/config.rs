//! Configuration model.
//!
//! ```toml
//! [resolve]
//! tree_shake = false
//! tree_shake_entries = ["renderPage"]
//! search_roots = [".plugins"]
//! excluded_modules = ["aws-sdk"]
//! fallback_roots = []
//!
//! [package]
//! build_python_source = false
//! compression_level = 6
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Highest deflate level accepted by the archive writer.
pub const MAX_COMPRESSION_LEVEL: u8 = 9;

fn default_excluded_modules() -> Vec<String> {
    vec!["aws-sdk".to_string()]
}

fn default_compression_level() -> u8 {
    6
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShipitConfig {
    pub resolve: ResolveSettings,
    pub package: PackageSettings,
}

/// Dependency resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveSettings {
    /// Tree-shake every package edge.
    pub tree_shake: bool,
    /// Import names (file stems) that switch their subtree to tree-shaking.
    pub tree_shake_entries: Vec<String>,
    /// Auxiliary module-search base directories.
    pub search_roots: Vec<PathBuf>,
    /// Modules provided by the runtime and never bundled.
    #[serde(default = "default_excluded_modules")]
    pub excluded_modules: Vec<String>,
    /// Extra module directories for the host fallback lookup.
    pub fallback_roots: Vec<PathBuf>,
}

impl Default for ResolveSettings {
    fn default() -> Self {
        Self {
            tree_shake: false,
            tree_shake_entries: Vec::new(),
            search_roots: Vec::new(),
            excluded_modules: default_excluded_modules(),
            fallback_roots: Vec::new(),
        }
    }
}

/// Archive production settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageSettings {
    /// Package `<name>/<name>.py` directories as python functions.
    pub build_python_source: bool,
    /// Deflate level, 0 to 9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            build_python_source: false,
            compression_level: default_compression_level(),
        }
    }
}

impl ShipitConfig {
    /// Create from a JSON value, e.g. the `shipit` field of package.json.
    ///
    /// ```
    /// use shipit_config::ShipitConfig;
    /// use serde_json::json;
    ///
    /// let config = ShipitConfig::from_value(json!({
    ///     "resolve": { "tree_shake": true }
    /// }))
    /// .unwrap();
    /// assert!(config.resolve.tree_shake);
    /// assert_eq!(config.resolve.excluded_modules, vec!["aws-sdk"]);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let config: ShipitConfig =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "config".to_string(),
                hint: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.package.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::InvalidValue {
                field: "package.compression_level".to_string(),
                hint: format!(
                    "expected 0..={MAX_COMPRESSION_LEVEL}, got {}",
                    self.package.compression_level
                ),
            });
        }

        if let Some(empty) = self
            .resolve
            .tree_shake_entries
            .iter()
            .find(|entry| entry.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "resolve.tree_shake_entries".to_string(),
                hint: format!("entry names must not be empty (got {empty:?})"),
            });
        }

        Ok(())
    }

    /// Make relative search and fallback roots absolute against `root`.
    pub fn rebase(mut self, root: &Path) -> Self {
        let rebase = |paths: &mut Vec<PathBuf>| {
            for path in paths.iter_mut() {
                if path.is_relative() {
                    *path = root.join(&*path);
                }
            }
        };
        rebase(&mut self.resolve.search_roots);
        rebase(&mut self.resolve.fallback_roots);
        self
    }
}
