//! Options controlling a dependency resolution.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::policy::{EntryNameTrigger, TreeShakeTrigger};

/// Runtime-provided modules that are never bundled.
pub const DEFAULT_EXCLUDED_MODULES: &[&str] = &["aws-sdk"];

/// Prefix of type-declaration packages, never needed at runtime.
const TYPES_SCOPE: &str = "@types/";

/// Feature flags accepted by [`crate::resolve_dependencies`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Tree-shake every package edge.
    #[serde(default)]
    pub tree_shake: bool,
}

/// Full set of resolution options.
#[derive(Clone)]
pub struct ResolveOptions {
    /// Auxiliary base directories searched after the importer's directory.
    pub search_roots: Vec<PathBuf>,
    /// Extra host-level module directories for the fallback lookup.
    pub fallback_roots: Vec<PathBuf>,
    /// Module names never bundled.
    pub excluded_modules: FxHashSet<String>,
    /// Tree-shake every package edge.
    pub tree_shake: bool,
    /// Per-edge tree-shaking predicate.
    pub tree_shake_trigger: Arc<dyn TreeShakeTrigger>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            search_roots: Vec::new(),
            fallback_roots: Vec::new(),
            excluded_modules: DEFAULT_EXCLUDED_MODULES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
            tree_shake: false,
            tree_shake_trigger: Arc::new(EntryNameTrigger::default()),
        }
    }
}

impl fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut excluded: Vec<&String> = self.excluded_modules.iter().collect();
        excluded.sort();
        f.debug_struct("ResolveOptions")
            .field("search_roots", &self.search_roots)
            .field("fallback_roots", &self.fallback_roots)
            .field("excluded_modules", &excluded)
            .field("tree_shake", &self.tree_shake)
            .field("tree_shake_trigger", &self.tree_shake_trigger)
            .finish()
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.search_roots.extend(roots);
        self
    }

    pub fn with_fallback_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
        self.fallback_roots.extend(roots);
        self
    }

    /// Replace the excluded module set.
    pub fn with_excluded_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_feature_flags(mut self, flags: FeatureFlags) -> Self {
        self.tree_shake = flags.tree_shake;
        self
    }

    pub fn with_tree_shake_trigger(mut self, trigger: impl TreeShakeTrigger + 'static) -> Self {
        self.tree_shake_trigger = Arc::new(trigger);
        self
    }

    /// Whether `name` must never be bundled.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded_modules.contains(name) || name.starts_with(TYPES_SCOPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_exclusions() {
        let options = ResolveOptions::default();
        assert!(options.is_excluded("aws-sdk"));
        assert!(options.is_excluded("@types/node"));
        assert!(!options.is_excluded("left-pad"));
        assert!(!options.tree_shake);
    }

    #[test]
    fn test_replacing_exclusions_keeps_types_scope() {
        let options = ResolveOptions::new().with_excluded_modules(["sharp"]);
        assert!(options.is_excluded("sharp"));
        assert!(!options.is_excluded("aws-sdk"));
        assert!(options.is_excluded("@types/react"));
    }

    #[test]
    fn test_feature_flags() {
        let options = ResolveOptions::new().with_feature_flags(FeatureFlags { tree_shake: true });
        assert!(options.tree_shake);
    }
}
