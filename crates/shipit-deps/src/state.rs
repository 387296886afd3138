//! Per-run traversal state.
//!
//! Every set uses `DashSet::insert` as an atomic test-and-insert: the first
//! caller to mark an item gets `true` and owns its expansion, every later
//! caller gets `false` and does nothing. No ordering between concurrent
//! callers is required.

use std::path::{Path, PathBuf};

use dashmap::DashSet;

/// Visited sets of one resolution run. Never shared between runs.
#[derive(Debug, Default)]
pub struct TraversalState {
    visited_files: DashSet<PathBuf>,
    visited_module_names: DashSet<String>,
    visited_package_dirs: DashSet<PathBuf>,
}

impl TraversalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a local file; `true` if this call was first.
    pub fn mark_file(&self, path: &Path) -> bool {
        self.visited_files.insert(path.to_path_buf())
    }

    /// Mark a bare module name; `true` if this call was first.
    pub fn mark_module_name(&self, name: &str) -> bool {
        self.visited_module_names.insert(name.to_string())
    }

    /// Mark a package root directory; `true` if this call was first.
    pub fn mark_package_dir(&self, dir: &Path) -> bool {
        self.visited_package_dirs.insert(dir.to_path_buf())
    }

    /// Visited module names, sorted.
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .visited_module_names
            .iter()
            .map(|name| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn package_dir_count(&self) -> usize {
        self.visited_package_dirs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_first_writer_wins() {
        let state = TraversalState::new();
        assert!(state.mark_file(Path::new("/app/handler.js")));
        assert!(!state.mark_file(Path::new("/app/handler.js")));

        assert!(state.mark_module_name("left-pad"));
        assert!(!state.mark_module_name("left-pad"));

        assert!(state.mark_package_dir(Path::new("/app/node_modules/left-pad")));
        assert!(!state.mark_package_dir(Path::new("/app/node_modules/left-pad")));
        assert_eq!(state.package_dir_count(), 1);
    }

    #[test]
    fn test_concurrent_marks_have_one_winner() {
        let state = TraversalState::new();
        let winners = AtomicUsize::new(0);

        (0..64).into_par_iter().for_each(|_| {
            if state.mark_package_dir(Path::new("/app/node_modules/shared")) {
                winners.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_module_names_sorted() {
        let state = TraversalState::new();
        state.mark_module_name("zod");
        state.mark_module_name("@scope/a");
        state.mark_module_name("left-pad");
        assert_eq!(state.module_names(), vec!["@scope/a", "left-pad", "zod"]);
    }
}
