//! Node-style package and file resolution.
//!
//! Paths are normalized lexically and never canonicalized, so a package
//! reached through a symlink keeps its on-disk location inside the
//! project. Sibling lookups relative to such a package then see the same
//! layout the package sees at runtime.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::Deserialize;

use crate::module_name;
use crate::package_json::PACKAGE_JSON;

/// Name of the dependency storage directory.
pub const NODE_MODULES: &str = "node_modules";

/// Extensions tried, in order, when a path does not name a file as-is.
pub const EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "json", "node"];

/// No candidate directory holds the requested module.
///
/// Recoverable: the walker decides whether the miss is acceptable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot find module '{request}' (searched {} directories)", searched.len())]
pub struct ModuleNotFound {
    pub request: String,
    pub searched: Vec<PathBuf>,
}

/// Ancestor `node_modules` directories of `base`, nearest first.
///
/// Ancestors that are themselves named `node_modules` contribute nothing,
/// so `a/node_modules/b` yields `a/node_modules/b/node_modules`,
/// `a/node_modules` and `node_modules` at the root.
pub fn node_modules_paths(base: &Path) -> Vec<PathBuf> {
    base.ancestors()
        .filter(|dir| dir.file_name().is_none_or(|name| name != NODE_MODULES))
        .map(|dir| dir.join(NODE_MODULES))
        .collect()
}

/// Module directories listed in `NODE_PATH`, `$HOME/.node_modules` and
/// `$HOME/.node_libraries`, preceded by `extra`.
pub fn host_module_dirs(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = extra.iter().map(|dir| dir.clean()).collect();

    if let Some(node_path) = std::env::var_os("NODE_PATH") {
        dirs.extend(
            std::env::split_paths(&node_path)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.clean()),
        );
    }

    if let Some(home) = std::env::var_os("HOME").filter(|home| !home.is_empty()) {
        let home = PathBuf::from(home);
        dirs.push(home.join(".node_modules"));
        dirs.push(home.join(".node_libraries"));
    }

    dirs
}

/// Resolve `path` as a file: as-is, then with each extension appended.
pub fn load_as_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    EXTENSIONS.iter().find_map(|ext| {
        let mut candidate = path.as_os_str().to_owned();
        candidate.push(".");
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}

/// Resolve `dir` as a directory: manifest `main`, then `index.<ext>`.
pub fn load_as_directory(dir: &Path) -> Option<PathBuf> {
    if let Some(main) = read_main(dir) {
        let target = dir.join(main).clean();
        if let Some(file) = load_as_file(&target).or_else(|| load_index(&target)) {
            return Some(file);
        }
    }
    load_index(dir)
}

fn load_index(dir: &Path) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("index.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// `main` of the manifest in `dir`; unreadable manifests count as absent.
fn read_main(dir: &Path) -> Option<String> {
    #[derive(Deserialize)]
    struct MainField {
        main: Option<String>,
    }

    let content = std::fs::read_to_string(dir.join(PACKAGE_JSON)).ok()?;
    serde_json::from_str::<MainField>(&content)
        .ok()?
        .main
        .filter(|main| !main.is_empty())
}

/// Resolve a path-like target as a file, then as a directory.
pub fn resolve_file(target: &Path) -> Option<PathBuf> {
    let target = target.clean();
    load_as_file(&target).or_else(|| load_as_directory(&target))
}

/// Locates installed packages from a fixed set of search roots.
#[derive(Debug, Clone, Default)]
pub struct PackageResolver {
    search_roots: Vec<PathBuf>,
    fallback_dirs: Vec<PathBuf>,
}

impl PackageResolver {
    /// `search_roots` are auxiliary base directories tried after the
    /// importer's directory. `fallback_dirs` are module directories that
    /// hold packages directly and are only consulted by
    /// [`Self::find_package_fallback`].
    pub fn new(search_roots: Vec<PathBuf>, fallback_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_roots: search_roots.iter().map(|root| root.clean()).collect(),
            fallback_dirs,
        }
    }

    /// Base directories for an importer: its own directory, then the roots.
    fn base_dirs(&self, importer_dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
        std::iter::once(importer_dir.clean()).chain(self.search_roots.iter().cloned())
    }

    /// Manifest path of package `name` as seen from `importer_dir`.
    pub fn find_package(
        &self,
        name: &str,
        importer_dir: &Path,
    ) -> Result<PathBuf, ModuleNotFound> {
        let module_dirs: Vec<PathBuf> = self
            .base_dirs(importer_dir)
            .flat_map(|base| node_modules_paths(&base))
            .collect();
        find_in_module_dirs(name, &module_dirs)
    }

    /// Manifest path of package `name` in the host-level search directories.
    pub fn find_package_fallback(&self, name: &str) -> Result<PathBuf, ModuleNotFound> {
        find_in_module_dirs(name, &self.fallback_dirs)
    }

    /// Resolve a relative or bare specifier to a file.
    ///
    /// Relative specifiers are joined to `importer_dir`. Bare specifiers are
    /// looked up as `<module dir>/<specifier>` across the importer's
    /// `node_modules` chain and the search roots.
    pub fn resolve_path(
        &self,
        specifier: &str,
        importer_dir: &Path,
    ) -> Result<PathBuf, ModuleNotFound> {
        let specifier = module_name::normalize_separators(specifier);

        let candidates: Vec<PathBuf> = match module_name::classify(&specifier) {
            module_name::SpecifierKind::Relative => vec![importer_dir.join(&specifier)],
            module_name::SpecifierKind::Bare => self
                .base_dirs(importer_dir)
                .flat_map(|base| node_modules_paths(&base))
                .map(|dir| dir.join(&specifier))
                .collect(),
        };

        candidates
            .iter()
            .find_map(|candidate| resolve_file(candidate))
            .ok_or_else(|| ModuleNotFound {
                request: specifier.clone(),
                searched: candidates.iter().map(|c| c.clean()).collect(),
            })
    }
}

fn find_in_module_dirs(name: &str, module_dirs: &[PathBuf]) -> Result<PathBuf, ModuleNotFound> {
    module_dirs
        .iter()
        .map(|dir| dir.join(name).join(PACKAGE_JSON).clean())
        .find(|manifest| manifest.is_file())
        .ok_or_else(|| ModuleNotFound {
            request: name.to_string(),
            searched: module_dirs.to_vec(),
        })
}
