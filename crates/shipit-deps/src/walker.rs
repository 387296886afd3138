//! The dependency graph walker.
//!
//! Starting from an entry file, the walker lists each local file's imports,
//! recurses into relative ones, and hands bare ones to package handling.
//! Packages contribute either their whole published file set or, on
//! tree-shaken edges, only the files reachable from the imported entry.
//! Either way their declared dependencies are walked too, which makes the
//! closure transitive over the install tree.
//!
//! Sibling specifiers and declared dependencies are visited in parallel.
//! Every expansion is gated by an atomic insert into [`TraversalState`],
//! so each file is listed and each package directory expanded at most once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashSet;
use path_clean::PathClean;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::{DepsError, Result};
use crate::imports::{ImportLister, OxcImportLister};
use crate::module_name::{self, SpecifierKind};
use crate::options::ResolveOptions;
use crate::package_json::{ManifestCache, PACKAGE_JSON, PackageJson};
use crate::policy::{EdgePolicy, edge_policy};
use crate::published::published_files;
use crate::resolver::{self, PackageResolver};
use crate::side_files::side_files;
use crate::state::TraversalState;

/// What a bare-specifier edge contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The package's files were added.
    Included,
    /// The module is runtime-provided and never bundled.
    Excluded,
    /// The module is an optional dependency that is not installed.
    OptionalAbsent,
    /// The package directory was already expanded.
    Visited,
    /// The specifier names no installable package.
    Skipped,
}

/// Where a bare edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeOrigin {
    /// An import statement in a source file.
    Import,
    /// A dependency declared in a package manifest.
    Declared,
}

/// The closure of an entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Absolute paths, sorted, each listed once.
    pub files: Vec<PathBuf>,
    /// Bare module names reached during the walk, sorted.
    pub module_names: Vec<String>,
}

/// Resolves dependency closures of entry files.
///
/// The manifest cache is shared by every call on the same resolver. Each
/// call gets its own fresh [`TraversalState`].
pub struct DependencyResolver {
    options: ResolveOptions,
    packages: PackageResolver,
    manifests: ManifestCache,
    lister: Arc<dyn ImportLister>,
}

impl std::fmt::Debug for DependencyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyResolver")
            .field("options", &self.options)
            .field("cached_manifests", &self.manifests.len())
            .finish_non_exhaustive()
    }
}

impl DependencyResolver {
    /// Create a resolver using the oxc-backed import lister.
    pub fn new(options: ResolveOptions) -> Self {
        Self::with_import_lister(options, OxcImportLister::new())
    }

    /// Create a resolver with a custom import lister.
    pub fn with_import_lister(options: ResolveOptions, lister: impl ImportLister + 'static) -> Self {
        let fallback_dirs = resolver::host_module_dirs(&options.fallback_roots);
        let packages = PackageResolver::new(options.search_roots.clone(), fallback_dirs);
        Self {
            options,
            packages,
            manifests: ManifestCache::new(),
            lister: Arc::new(lister),
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve the closure of `entry_file`.
    ///
    /// `base_dir` locates the project manifest (nearest `package.json` at or
    /// above it) whose optional dependencies apply to the entry's imports.
    pub fn resolve(&self, entry_file: &Path, base_dir: &Path) -> Result<Resolution> {
        let entry = absolute(entry_file)?;
        if !entry.is_file() {
            return Err(DepsError::EntryNotFound { path: entry });
        }

        let base_dir = absolute(base_dir)?;
        let project_manifest = match PackageJson::find_from_dir(&base_dir) {
            Some(path) => Some(Arc::new(PackageJson::from_path(&path)?)),
            None => None,
        };

        debug!(
            entry = %entry.display(),
            base_dir = %base_dir.display(),
            tree_shake = self.options.tree_shake,
            "resolving dependencies"
        );

        let walk = Walk {
            resolver: self,
            state: TraversalState::new(),
            collected: DashSet::new(),
        };
        walk.visit_file(&entry, project_manifest.as_ref(), EdgePolicy::FullPackage)?;

        let mut files: Vec<PathBuf> = walk.collected.into_iter().collect();
        files.sort();

        debug!(
            entry = %entry.display(),
            files = files.len(),
            packages = walk.state.package_dir_count(),
            "resolved dependencies"
        );

        Ok(Resolution {
            files,
            module_names: walk.state.module_names(),
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map(|path| path.clean())
        .map_err(|e| DepsError::io(path, e))
}

/// The file or manifest an edge starts from.
struct Importer<'m> {
    /// Reported in diagnostics.
    file: PathBuf,
    /// Base directory for resolution.
    dir: PathBuf,
    /// Manifest whose optional dependencies may be missing.
    manifest: Option<&'m Arc<PackageJson>>,
}

/// One resolution run.
struct Walk<'r> {
    resolver: &'r DependencyResolver,
    state: TraversalState,
    collected: DashSet<PathBuf>,
}

impl Walk<'_> {
    fn options(&self) -> &ResolveOptions {
        &self.resolver.options
    }

    fn visit_file(
        &self,
        file: &Path,
        manifest: Option<&Arc<PackageJson>>,
        policy: EdgePolicy,
    ) -> Result<()> {
        if !self.state.mark_file(file) {
            return Ok(());
        }
        trace!(file = %file.display(), "visiting file");
        self.collected.insert(file.to_path_buf());

        let specifiers = self.resolver.lister.list_imports(file)?;
        let importer = Importer {
            file: file.to_path_buf(),
            dir: file.parent().map(Path::to_path_buf).unwrap_or_default(),
            manifest,
        };

        specifiers
            .par_iter()
            .try_for_each(|specifier| self.visit_specifier(specifier, &importer, policy))
    }

    fn visit_specifier(
        &self,
        specifier: &str,
        importer: &Importer<'_>,
        inherited: EdgePolicy,
    ) -> Result<()> {
        let specifier = module_name::normalize_separators(specifier);
        let options = self.options();
        let policy = edge_policy(
            inherited,
            options.tree_shake,
            options.tree_shake_trigger.as_ref(),
            &specifier,
        );

        match module_name::classify(&specifier) {
            SpecifierKind::Relative => {
                let target = self
                    .resolver
                    .packages
                    .resolve_path(&specifier, &importer.dir)
                    .map_err(|_| DepsError::UnresolvedImport {
                        specifier: specifier.clone(),
                        importer: importer.file.clone(),
                    })?;
                self.visit_file(&target, importer.manifest, policy)
            }
            SpecifierKind::Bare => {
                let outcome = self.visit_module(&specifier, importer, policy, EdgeOrigin::Import)?;
                trace!(specifier = %specifier, ?outcome, "bare import");
                Ok(())
            }
        }
    }

    fn visit_module(
        &self,
        specifier: &str,
        importer: &Importer<'_>,
        policy: EdgePolicy,
        origin: EdgeOrigin,
    ) -> Result<EdgeOutcome> {
        let Some(name) = module_name::package_name(specifier) else {
            return Ok(EdgeOutcome::Skipped);
        };

        if self.options().is_excluded(name) {
            debug!(module = name, "skipping excluded module");
            return Ok(EdgeOutcome::Excluded);
        }

        // Names are not a dedup key: nested installs of one name at other
        // versions live in other directories and ship separately.
        let Some(package_dir) = self.locate(name, importer)? else {
            return Ok(EdgeOutcome::OptionalAbsent);
        };

        match policy {
            EdgePolicy::FullPackage => self.expand_package(name, &package_dir),
            EdgePolicy::TreeShake => {
                self.shake_package(specifier, name, &package_dir, importer, origin)
            }
        }
    }

    /// Package directory of `name`, `None` when it is an absent optional.
    fn locate(&self, name: &str, importer: &Importer<'_>) -> Result<Option<PathBuf>> {
        let packages = &self.resolver.packages;

        let not_found = match packages.find_package(name, &importer.dir) {
            Ok(manifest) => return Ok(Some(package_dir_of(&manifest))),
            Err(not_found) => not_found,
        };

        if importer.manifest.is_some_and(|manifest| manifest.is_optional(name)) {
            warn!("missing optional dependency: {name}");
            return Ok(None);
        }

        match packages.find_package_fallback(name) {
            Ok(manifest) => {
                debug!(module = name, path = %manifest.display(), "found module in host search path");
                Ok(Some(package_dir_of(&manifest)))
            }
            Err(_) => {
                debug!(
                    module = name,
                    searched = not_found.searched.len(),
                    "module not found"
                );
                Err(DepsError::UnresolvedDependency {
                    module: name.to_string(),
                    importer: importer.file.clone(),
                })
            }
        }
    }

    /// Add the whole published file set of a package.
    fn expand_package(&self, name: &str, package_dir: &Path) -> Result<EdgeOutcome> {
        // Both indices are kept even when the directory was reached under another name.
        self.state.mark_module_name(name);
        if !self.state.mark_package_dir(package_dir) {
            return Ok(EdgeOutcome::Visited);
        }

        let manifest = self.resolver.manifests.load(package_dir)?;
        let published = published_files(package_dir, &manifest)?;
        let side = side_files(package_dir, name)?;
        debug!(
            module = name,
            dir = %package_dir.display(),
            files = published.len(),
            side_files = side.len(),
            "including package"
        );
        for file in published.into_iter().chain(side) {
            self.collected.insert(file);
        }

        self.visit_declared(&manifest, package_dir, EdgePolicy::FullPackage)?;
        Ok(EdgeOutcome::Included)
    }

    /// Follow a package file by file from the imported entry.
    fn shake_package(
        &self,
        specifier: &str,
        name: &str,
        package_dir: &Path,
        importer: &Importer<'_>,
        origin: EdgeOrigin,
    ) -> Result<EdgeOutcome> {
        self.state.mark_module_name(name);
        let manifest = self.resolver.manifests.load(package_dir)?;

        // The manifest is the once-per-package gate for tree-shaken packages.
        // It is independent of the package-dir gate, so a full expansion and
        // a shaken walk of the same package both run whatever their order.
        let manifest_path = package_dir.join(PACKAGE_JSON);
        if self.state.mark_file(&manifest_path) {
            self.collected.insert(manifest_path);
            for file in side_files(package_dir, name)? {
                self.collected.insert(file);
            }
            self.visit_declared(&manifest, package_dir, EdgePolicy::TreeShake)?;
        }

        let entry = match module_name::sub_path(specifier) {
            Some(sub_path) => resolver::resolve_file(&package_dir.join(sub_path)),
            None => resolver::load_as_directory(package_dir),
        };
        let Some(entry) = entry else {
            return match origin {
                EdgeOrigin::Declared => {
                    debug!(module = name, "declared dependency has no entry file");
                    Ok(EdgeOutcome::Included)
                }
                EdgeOrigin::Import => Err(DepsError::UnresolvedDependency {
                    module: specifier.to_string(),
                    importer: importer.file.clone(),
                }),
            };
        };

        trace!(module = name, entry = %entry.display(), "tree-shaking package");
        self.visit_file(&entry, Some(&manifest), EdgePolicy::TreeShake)?;
        Ok(EdgeOutcome::Included)
    }

    /// Walk a package's declared dependencies with the package as importer.
    fn visit_declared(
        &self,
        manifest: &Arc<PackageJson>,
        package_dir: &Path,
        policy: EdgePolicy,
    ) -> Result<()> {
        let importer = Importer {
            file: package_dir.join(PACKAGE_JSON),
            dir: package_dir.to_path_buf(),
            manifest: Some(manifest),
        };

        manifest
            .nested_dependency_names()
            .par_iter()
            .try_for_each(|name| {
                self.visit_module(name, &importer, policy, EdgeOrigin::Declared)
                    .map(|_| ())
            })
    }
}

fn package_dir_of(manifest: &Path) -> PathBuf {
    manifest.parent().map(Path::to_path_buf).unwrap_or_default()
}
