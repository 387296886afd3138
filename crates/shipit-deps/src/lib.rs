//! # shipit-deps
//!
//! Dependency closure resolution for Node.js serverless functions.
//!
//! Given an entry file, the resolver finds every local file and every
//! installed package the function needs at runtime:
//!
//! - relative imports are followed file by file;
//! - bare imports pull in the package's published file set plus any known
//!   side files, then recurse into the package's declared dependencies;
//! - on tree-shaken edges a package is instead followed file by file from
//!   the imported entry.
//!
//! Resolution is symlink preserving and Node compatible (ancestor
//! `node_modules` lookup, scoped names, `main` and `index` fallbacks).
//!
//! ```no_run
//! use shipit_deps::{FeatureFlags, resolve_dependencies};
//! use std::path::Path;
//!
//! # fn main() -> shipit_deps::Result<()> {
//! let files = resolve_dependencies(
//!     Path::new("functions/hello/hello.js"),
//!     Path::new("functions/hello"),
//!     &[],
//!     FeatureFlags::default(),
//! )?;
//! for file in files {
//!     println!("{}", file.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod imports;
pub mod module_name;
pub mod options;
pub mod package_json;
pub mod policy;
pub mod published;
pub mod resolver;
pub mod side_files;
pub mod state;
pub mod walker;

use std::path::{Path, PathBuf};

pub use error::{DepsError, Result};
pub use imports::{ImportLister, OxcImportLister};
pub use options::{DEFAULT_EXCLUDED_MODULES, FeatureFlags, ResolveOptions};
pub use package_json::{ManifestCache, PackageJson};
pub use policy::{EdgePolicy, EntryNameTrigger, TreeShakeTrigger};
pub use resolver::{ModuleNotFound, PackageResolver};
pub use state::TraversalState;
pub use walker::{DependencyResolver, EdgeOutcome, Resolution};

/// Resolve the sorted dependency closure of `entry_file`.
///
/// `search_roots` are auxiliary directories searched after the importer's
/// own `node_modules` chain. Every other option takes its default; build a
/// [`DependencyResolver`] to configure more or to share the manifest cache
/// between calls.
pub fn resolve_dependencies(
    entry_file: &Path,
    base_dir: &Path,
    search_roots: &[PathBuf],
    flags: FeatureFlags,
) -> Result<Vec<PathBuf>> {
    let options = ResolveOptions::new()
        .with_search_roots(search_roots.iter().cloned())
        .with_feature_flags(flags);
    DependencyResolver::new(options)
        .resolve(entry_file, base_dir)
        .map(|resolution| resolution.files)
}
