//! Shared project-tree builders for shipit-deps tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throw-away project directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, relative: &str, content: &str) -> &Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// Install a package under `node_modules` with an `index.js` entry.
    pub fn package(&self, name: &str, manifest: &str) -> &Self {
        self.file(&format!("node_modules/{name}/package.json"), manifest);
        self.file(&format!("node_modules/{name}/index.js"), "module.exports = {};");
        self
    }

    /// Paths relative to the project root with `/` separators.
    pub fn relative(&self, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|file| {
                file.strip_prefix(self.root())
                    .unwrap_or(file)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }
}
