//! Function discovery and runtime dispatch.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use shipit_deps::PackageJson;

use crate::binary::is_go_executable;
use crate::error::{PackError, Result};
use crate::runtime::Runtime;

const NODE_MODULES: &str = "node_modules";

/// How a function source is packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// A prebuilt `.zip`, copied as-is.
    Archive,
    /// A `.js` file or a directory with a JavaScript handler.
    Node,
    /// A Go executable.
    Go,
    /// A `<name>/<name>.py` directory.
    Python,
}

/// A packageable entry of the functions directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSource {
    pub name: String,
    pub path: PathBuf,
    pub kind: FunctionKind,
}

impl FunctionSource {
    pub fn runtime(&self) -> Runtime {
        match self.kind {
            FunctionKind::Archive | FunctionKind::Node => Runtime::Js,
            FunctionKind::Go => Runtime::Go,
            FunctionKind::Python => Runtime::Py,
        }
    }

    /// `<dest>/<name>.zip`
    pub fn archive_path(&self, dest: &Path) -> PathBuf {
        dest.join(format!("{}.zip", self.name))
    }
}

/// File name of `path` without a trailing `.js` or `.zip`.
pub fn function_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name
        .strip_suffix(".js")
        .or_else(|| file_name.strip_suffix(".zip"))
        .unwrap_or(file_name);
    Some(name.to_string())
}

/// Classify one entry of the functions directory.
///
/// Returns `None` for `node_modules` and for anything no runtime handles.
pub fn detect(path: &Path, build_python_source: bool) -> Option<FunctionSource> {
    let file_name = path.file_name()?.to_str()?;
    if file_name == NODE_MODULES {
        return None;
    }
    let name = function_name(path)?;
    let metadata = fs::metadata(path).ok()?;
    let extension = path.extension().and_then(|ext| ext.to_str());

    let kind = if metadata.is_file() && extension == Some("zip") {
        FunctionKind::Archive
    } else if metadata.is_dir() && build_python_source && is_python_dir(path, file_name) {
        FunctionKind::Python
    } else if metadata.is_dir() || extension == Some("js") {
        FunctionKind::Node
    } else if metadata.is_file() && is_go_executable(path) {
        FunctionKind::Go
    } else {
        return None;
    };

    Some(FunctionSource {
        name,
        path: path.to_path_buf(),
        kind,
    })
}

fn is_python_dir(dir: &Path, name: &str) -> bool {
    dir.join(format!("{name}.py")).is_file()
}

/// All functions in `src_dir`, sorted by name.
pub fn discover_functions(src_dir: &Path, build_python_source: bool) -> Result<Vec<FunctionSource>> {
    if !src_dir.is_dir() {
        return Err(PackError::InvalidSource(src_dir.to_path_buf()));
    }
    let src_dir = absolute(src_dir)?;
    let entries = fs::read_dir(&src_dir).map_err(|e| PackError::io(&src_dir, e))?;

    let mut functions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PackError::io(&src_dir, e))?;
        match detect(&entry.path(), build_python_source) {
            Some(function) => functions.push(function),
            None => tracing::debug!(path = %entry.path().display(), "not a function, skipped"),
        }
    }
    functions.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    Ok(functions)
}

/// Handler of a function directory: `<dir>/<name>.js`, then `<dir>/index.js`.
pub fn find_handler(dir: &Path) -> Result<PathBuf> {
    let named = dir
        .file_name()
        .map(|name| dir.join(format!("{}.js", name.to_string_lossy())));
    let candidates = named.into_iter().chain(std::iter::once(dir.join("index.js")));
    for candidate in candidates {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(PackError::MissingHandler {
        dir: dir.to_path_buf(),
    })
}

/// Nearest directory at or above `dir` holding a `package.json`.
pub fn find_module_dir(dir: &Path) -> Option<PathBuf> {
    PackageJson::find_from_dir(dir).and_then(|manifest| manifest.parent().map(Path::to_path_buf))
}

pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .map(|path| path.clean())
        .map_err(|e| PackError::io(path, e))
}
