//! Package manifest parsing and the process-lifetime manifest cache.
//!
//! Only the fields the walker consumes are modelled: the package name, the
//! `main` entry, the `files` inclusion list and the dependency maps. The
//! manifest is deserialized, never evaluated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::{DepsError, Result};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// Manifest file name.
pub const PACKAGE_JSON: &str = "package.json";

/// Declared peer dependencies that are build-time tooling, never needed at runtime.
const BUILD_ONLY_PEERS: &[&str] = &["prisma", "@prisma/cli", "prisma2"];

/// Parsed package.json structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// Entry file relative to the package root
    pub main: Option<String>,
    /// Explicit inclusion list (npm `files`)
    pub files: Option<Vec<String>>,
    /// Production dependencies
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    /// Peer dependencies
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: BTreeMap<String, String>,
    /// Per-peer metadata; only the `optional` marker is read
    #[serde(default, rename = "peerDependenciesMeta")]
    pub peer_dependencies_meta: BTreeMap<String, PeerDependencyMeta>,
    /// Optional dependencies
    #[serde(default, rename = "optionalDependencies")]
    pub optional_dependencies: BTreeMap<String, String>,
    /// File path this was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Entry of `peerDependenciesMeta`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    #[serde(default)]
    pub optional: bool,
}

impl PackageJson {
    /// Load and parse a manifest file.
    ///
    /// Any read or parse failure is an [`DepsError::InvalidManifest`]: the
    /// walker only opens manifests of packages it has to ship.
    pub fn from_path(path: &Path) -> Result<Self> {
        let invalid = |reason: String| DepsError::InvalidManifest {
            path: path.to_path_buf(),
            reason,
        };

        let metadata = std::fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
        if metadata.len() > MAX_PACKAGE_JSON_SIZE {
            return Err(invalid(format!(
                "file exceeds maximum size of {}MB",
                MAX_PACKAGE_JSON_SIZE / 1024 / 1024
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let mut pkg: PackageJson =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        pkg.path = path.to_path_buf();
        Ok(pkg)
    }

    /// Find the nearest `package.json` at or above `start_dir`.
    pub fn find_from_dir(start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(PACKAGE_JSON))
            .find(|candidate| candidate.is_file())
    }

    /// Names the walker recurses into when this package is shipped.
    ///
    /// Direct, peer (minus build-only tooling) and optional dependencies,
    /// de-duplicated and sorted.
    pub fn nested_dependency_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .dependencies
            .keys()
            .chain(
                self.peer_dependencies
                    .keys()
                    .filter(|name| !BUILD_ONLY_PEERS.contains(&name.as_str())),
            )
            .chain(self.optional_dependencies.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether a missing `name` is acceptable for this package.
    pub fn is_optional(&self, name: &str) -> bool {
        self.optional_dependencies.contains_key(name)
            || self
                .peer_dependencies_meta
                .get(name)
                .is_some_and(|meta| meta.optional)
    }
}

/// Manifests keyed by package directory.
///
/// Shared by every resolution run of one [`crate::DependencyResolver`].
/// Entries are never invalidated: installed packages do not change while a
/// packaging process runs.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: DashMap<PathBuf, Arc<PackageJson>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the manifest of the package rooted at `package_dir`.
    pub fn load(&self, package_dir: &Path) -> Result<Arc<PackageJson>> {
        if let Some(hit) = self.entries.get(package_dir) {
            return Ok(Arc::clone(hit.value()));
        }

        let manifest = Arc::new(PackageJson::from_path(&package_dir.join(PACKAGE_JSON))?);
        // Two racing loads parse the same file; the first insert wins.
        let entry = self
            .entries
            .entry(package_dir.to_path_buf())
            .or_insert(manifest);
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_package_json_parse() {
        let json = r#"{
            "name": "test-package",
            "version": "1.0.0",
            "main": "lib/index.js",
            "files": ["lib", "bin/*.js"],
            "dependencies": {
                "react": "^18.0.0",
                "lodash": "^4.17.21"
            },
            "devDependencies": {
                "@types/node": "^20.0.0"
            },
            "scripts": { "test": "jest" }
        }"#;

        let pkg: PackageJson = serde_json::from_str(json).unwrap();

        assert_eq!(pkg.name.as_deref(), Some("test-package"));
        assert_eq!(pkg.main.as_deref(), Some("lib/index.js"));
        assert_eq!(pkg.files.as_ref().map(Vec::len), Some(2));
        assert_eq!(pkg.dependencies.len(), 2);
        assert!(pkg.peer_dependencies.is_empty());
    }

    #[test]
    fn test_nested_dependency_names() {
        let json = r#"{
            "dependencies": { "b": "1", "a": "1" },
            "peerDependencies": { "prisma": "1", "react": "18", "a": "1" },
            "optionalDependencies": { "fsevents": "2" }
        }"#;
        let pkg: PackageJson = serde_json::from_str(json).unwrap();

        assert_eq!(pkg.nested_dependency_names(), vec!["a", "b", "fsevents", "react"]);
    }

    #[test]
    fn test_is_optional() {
        let json = r#"{
            "peerDependencies": { "pg": "8", "mysql": "2" },
            "peerDependenciesMeta": { "pg": { "optional": true } },
            "optionalDependencies": { "missing-optional": "1" }
        }"#;
        let pkg: PackageJson = serde_json::from_str(json).unwrap();

        assert!(pkg.is_optional("missing-optional"));
        assert!(pkg.is_optional("pg"));
        assert!(!pkg.is_optional("mysql"));
        assert!(!pkg.is_optional("left-pad"));
    }

    #[test]
    fn test_from_path_invalid_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PACKAGE_JSON);
        fs::write(&path, "{ not json").unwrap();

        let err = PackageJson::from_path(&path).unwrap_err();
        assert!(matches!(err, DepsError::InvalidManifest { .. }));
    }

    #[test]
    fn test_find_from_dir_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src/functions/hello");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(PACKAGE_JSON), r#"{"name":"site"}"#).unwrap();

        assert_eq!(
            PackageJson::find_from_dir(&nested),
            Some(temp.path().join(PACKAGE_JSON))
        );
    }

    #[test]
    fn test_cache_returns_shared_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PACKAGE_JSON), r#"{"name":"cached"}"#).unwrap();

        let cache = ManifestCache::new();
        let first = cache.load(temp.path()).unwrap();
        let second = cache.load(temp.path()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.path, temp.path().join(PACKAGE_JSON));
    }
}
