//! Node.js functions.
//!
//! A node archive holds the function's own tree plus the dependency
//! closure of its handler. Entry names are relative to the function's base
//! directory when possible, otherwise to the project root, so installed
//! packages land under `node_modules/` where the runtime looks for them.

use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use shipit_deps::DependencyResolver;
use tracing::debug;
use walkdir::WalkDir;

use crate::archive::{ArchiveSink, ZipArchive, add_path, entry_name};
use crate::error::{PackError, Result};
use crate::function::{absolute, find_handler, find_module_dir, function_name};
use crate::runtime::Runtime;
use crate::toolchain::add_toolchain_file;

const NODE_MODULES: &str = "node_modules";

/// Editor, OS and package-manager droppings never shipped.
static JUNK_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\.DS_Store|\._.+|Thumbs\.db|ehthumbs\.db|Desktop\.ini|npm-debug\.log.*|\..+\.swp|.+~)$",
    )
    .expect("junk file pattern is valid")
});

/// Whether `path` names a junk file.
pub fn is_junk(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    JUNK_FILE.is_match(name)
}

/// Files of one node function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFiles {
    /// The function directory, or the directory holding a single-file function.
    pub base_dir: PathBuf,
    /// Nearest directory at or above `base_dir` with a `package.json`.
    pub module_dir: Option<PathBuf>,
    /// Absolute paths, sorted and unique.
    pub files: Vec<PathBuf>,
}

impl NodeFiles {
    /// Archive entry name of `file`.
    pub fn entry_name(&self, file: &Path) -> String {
        entry_name(file, &self.base_dir)
            .or_else(|| {
                self.module_dir
                    .as_deref()
                    .and_then(|module_dir| entry_name(file, module_dir))
            })
            .or_else(|| node_modules_tail(file))
            .unwrap_or_else(|| {
                file.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
    }
}

/// `node_modules/...` from the last `node_modules` component of `file`.
fn node_modules_tail(file: &Path) -> Option<String> {
    let components: Vec<Component<'_>> = file.components().collect();
    let start = components
        .iter()
        .rposition(|component| component.as_os_str() == NODE_MODULES)?;
    let parts: Vec<String> = components[start..]
        .iter()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Collect the files of the node function at `function_path`.
///
/// For a directory this is every file under it except `node_modules`, plus
/// the closure of its handler. For a single `.js` file it is the file plus
/// its closure.
pub fn list_node_files(function_path: &Path, resolver: &DependencyResolver) -> Result<NodeFiles> {
    let function_path = absolute(function_path)?;
    let name = function_name(&function_path).unwrap_or_default();

    let (base_dir, handler, mut files) = if function_path.is_dir() {
        let handler = find_handler(&function_path)?;
        let tree = tree_files(&function_path)?;
        (function_path, handler, tree)
    } else {
        let base_dir = function_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        (base_dir, function_path.clone(), vec![function_path])
    };

    let module_dir = find_module_dir(&base_dir);
    let resolve_base = module_dir.as_deref().unwrap_or(&base_dir);
    let resolution = resolver
        .resolve(&handler, resolve_base)
        .map_err(|source| PackError::Resolve {
            function: name.clone(),
            source,
        })?;

    files.extend(resolution.files);
    files.retain(|file| !is_junk(file));
    files.sort();
    files.dedup();

    debug!(
        function = %name,
        files = files.len(),
        packages = resolution.module_names.len(),
        "listed node function files"
    );

    Ok(NodeFiles {
        base_dir,
        module_dir,
        files,
    })
}

fn tree_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || entry.file_name() != NODE_MODULES);
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            PackError::io(path, err.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Zip a node function into `archive_path`.
pub fn zip_node_function(
    function_path: &Path,
    archive_path: &Path,
    resolver: &DependencyResolver,
    compression_level: u8,
) -> Result<PathBuf> {
    let listing = list_node_files(function_path, resolver)?;

    let mut archive = ZipArchive::create(archive_path, compression_level)?;
    for file in &listing.files {
        add_path(&mut archive, file, &listing.entry_name(file))?;
    }
    add_toolchain_file(&mut archive, Runtime::Js)?;
    archive.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn junk_files() {
        for junk in [
            ".DS_Store",
            "._index.js",
            "Thumbs.db",
            "npm-debug.log",
            ".index.js.swp",
            "index.js~",
        ] {
            assert!(is_junk(Path::new(junk)), "{junk} should be junk");
        }
        for kept in ["index.js", ".env", "package.json", "swp.js"] {
            assert!(!is_junk(Path::new(kept)), "{kept} should be kept");
        }
    }

    #[test]
    fn entry_name_prefers_base_then_module_dir() {
        let listing = NodeFiles {
            base_dir: PathBuf::from("/srv/site/functions/hello"),
            module_dir: Some(PathBuf::from("/srv/site")),
            files: Vec::new(),
        };
        assert_eq!(
            listing.entry_name(Path::new("/srv/site/functions/hello/lib/util.js")),
            "lib/util.js"
        );
        assert_eq!(
            listing.entry_name(Path::new("/srv/site/node_modules/left-pad/index.js")),
            "node_modules/left-pad/index.js"
        );
        assert_eq!(
            listing.entry_name(Path::new("/opt/node/lib/node_modules/@acme/log/index.js")),
            "node_modules/@acme/log/index.js"
        );
        assert_eq!(listing.entry_name(Path::new("/etc/motd")), "motd");
    }
}
