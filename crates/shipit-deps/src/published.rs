//! Files a package ships, as declared by its `files` list or defaulted.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use path_clean::PathClean;
use rustc_hash::FxHashSet;
use walkdir::WalkDir;

use crate::error::{DepsError, Result};
use crate::package_json::{PACKAGE_JSON, PackageJson};
use crate::resolver::{self, NODE_MODULES};

/// File names never shipped from a package without a `files` list, at any
/// depth, on top of its `node_modules/`.
const IGNORED_PATTERNS: &[&str] = &[
    ".npmignore",
    "package-lock.json",
    "yarn.lock",
    "*.log",
    "*.lock",
    "*~",
    "*.map",
    "*.ts",
    "*.patch",
];

/// Root-level files shipped even when a `files` list omits them.
const ALWAYS_INCLUDED_PATTERNS: &[&str] = &["README*", "LICENSE*", "LICENCE*", "CHANGELOG*"];

/// Absolute paths of every file published by the package in `package_dir`.
///
/// The package's own `node_modules` is never entered; nested packages are
/// reached independently through the dependency walk.
pub fn published_files(package_dir: &Path, manifest: &PackageJson) -> Result<Vec<PathBuf>> {
    let mut files: FxHashSet<PathBuf> = FxHashSet::default();

    match &manifest.files {
        Some(entries) => {
            for entry in entries {
                collect_declared(package_dir, entry, &mut files)?;
            }
            collect_always_included(package_dir, manifest, &mut files)?;
        }
        None => {
            let ignored = compile(IGNORED_PATTERNS)?;
            files.extend(walk_files(package_dir).filter(|file| !is_ignored(file, &ignored)));
        }
    }

    let mut files: Vec<PathBuf> = files.into_iter().collect();
    files.sort();
    Ok(files)
}

/// Every regular file under `dir`, skipping its top-level `node_modules`.
///
/// Symlinks are followed for enumeration but paths keep the link location.
/// Unreadable entries are skipped.
fn walk_files(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && entry.file_name() == NODE_MODULES))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}

fn is_ignored(file: &Path, ignored: &[Pattern]) -> bool {
    file.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| ignored.iter().any(|pattern| pattern.matches(name)))
}

/// One `files` entry: a file, a directory (recursively) or a glob.
fn collect_declared(
    package_dir: &Path,
    entry: &str,
    files: &mut FxHashSet<PathBuf>,
) -> Result<()> {
    let entry = entry.trim_start_matches("./").trim_end_matches('/');
    if entry.is_empty() {
        return Ok(());
    }

    let literal = package_dir.join(entry).clean();
    if !literal.starts_with(package_dir) {
        return Ok(());
    }
    if literal.is_file() {
        files.insert(literal);
        return Ok(());
    }
    if literal.is_dir() {
        files.extend(walk_files(&literal));
        return Ok(());
    }

    for matched in glob_under(package_dir, entry)? {
        if matched.is_dir() {
            files.extend(walk_files(&matched));
        } else if matched.is_file() {
            files.insert(matched);
        }
    }
    Ok(())
}

fn collect_always_included(
    package_dir: &Path,
    manifest: &PackageJson,
    files: &mut FxHashSet<PathBuf>,
) -> Result<()> {
    let manifest_path = package_dir.join(PACKAGE_JSON);
    if manifest_path.is_file() {
        files.insert(manifest_path);
    }

    let main_file = manifest
        .main
        .as_deref()
        .filter(|main| !main.is_empty())
        .and_then(|main| resolver::resolve_file(&package_dir.join(main)));
    files.extend(main_file);

    for pattern in ALWAYS_INCLUDED_PATTERNS {
        files.extend(
            glob_under(package_dir, pattern)?
                .into_iter()
                .filter(|path| path.is_file()),
        );
    }
    Ok(())
}

/// Expand `pattern` relative to `base`, case-insensitively, dotfiles included.
pub(crate) fn glob_under(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        Pattern::escape(&base.to_string_lossy()),
        pattern.trim_start_matches('/')
    );
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let paths = glob::glob_with(&full, options).map_err(|e| DepsError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    Ok(paths
        .filter_map(|path| match path {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::debug!("Skipping unreadable glob match: {err}");
                None
            }
        })
        .filter(|path| {
            path.strip_prefix(base)
                .map(|rel| rel.components().all(|c| c.as_os_str() != NODE_MODULES))
                .unwrap_or(false)
        })
        .collect())
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| DepsError::InvalidPattern {
                pattern: (*pattern).to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
