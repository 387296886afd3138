//! Per-edge inclusion policy.

use std::path::Path;

/// How a dependency edge contributes files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgePolicy {
    /// Ship the package's whole published file set.
    #[default]
    FullPackage,
    /// Follow the package file by file from the imported entry.
    TreeShake,
}

impl EdgePolicy {
    pub fn is_tree_shake(self) -> bool {
        matches!(self, Self::TreeShake)
    }
}

/// Decides whether an import specifier switches its subtree to tree-shaking.
pub trait TreeShakeTrigger: Send + Sync + std::fmt::Debug {
    fn triggers(&self, specifier: &str) -> bool;
}

/// Triggers on specifiers whose final path segment, minus its extension,
/// is one of the configured entry names.
///
/// `renderPage` matches `./renderPage`, `../lib/renderPage.js` and
/// `framework/dist/renderPage`.
#[derive(Debug, Clone, Default)]
pub struct EntryNameTrigger {
    names: Vec<String>,
}

impl EntryNameTrigger {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl TreeShakeTrigger for EntryNameTrigger {
    fn triggers(&self, specifier: &str) -> bool {
        if self.names.is_empty() {
            return false;
        }
        let last = specifier.rsplit(['/', '\\']).next().unwrap_or(specifier);
        let stem = Path::new(last)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(last);
        self.names.iter().any(|name| name == stem || name == last)
    }
}

/// Policy of an edge given the policy inherited from its importer.
///
/// Once an edge is tree-shaken every edge below it is too.
pub fn edge_policy(
    inherited: EdgePolicy,
    global_tree_shake: bool,
    trigger: &dyn TreeShakeTrigger,
    specifier: &str,
) -> EdgePolicy {
    if inherited.is_tree_shake() || global_tree_shake || trigger.triggers(specifier) {
        EdgePolicy::TreeShake
    } else {
        EdgePolicy::FullPackage
    }
}
