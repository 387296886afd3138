//! Packaging options.

use shipit_config::ShipitConfig;
use shipit_deps::{EntryNameTrigger, FeatureFlags, ResolveOptions};

/// Default deflate level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Options for a packaging run.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Dependency resolution options shared by every node function.
    pub resolve: ResolveOptions,
    /// Package `<name>/<name>.py` directories as python functions.
    pub build_python_source: bool,
    /// Deflate level, 0 stores entries uncompressed.
    pub compression_level: u8,
    /// Upper bound on functions packaged at once. Defaults to the CPU count, capped at 8.
    pub max_parallel: Option<usize>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            resolve: ResolveOptions::default(),
            build_python_source: false,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_parallel: None,
        }
    }
}

impl PackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from a loaded configuration.
    pub fn from_config(config: &ShipitConfig) -> Self {
        let settings = &config.resolve;
        let resolve = ResolveOptions::new()
            .with_search_roots(settings.search_roots.iter().cloned())
            .with_fallback_roots(settings.fallback_roots.iter().cloned())
            .with_excluded_modules(settings.excluded_modules.iter().cloned())
            .with_feature_flags(FeatureFlags {
                tree_shake: settings.tree_shake,
            })
            .with_tree_shake_trigger(EntryNameTrigger::new(
                settings.tree_shake_entries.iter().cloned(),
            ));

        Self {
            resolve,
            build_python_source: config.package.build_python_source,
            compression_level: config.package.compression_level,
            max_parallel: None,
        }
    }

    pub fn with_resolve_options(mut self, resolve: ResolveOptions) -> Self {
        self.resolve = resolve;
        self
    }

    pub fn with_python_source(mut self, enabled: bool) -> Self {
        self.build_python_source = enabled;
        self
    }

    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = Some(max.max(1));
        self
    }

    pub(crate) fn parallelism(&self) -> usize {
        self.max_parallel
            .unwrap_or_else(|| num_cpus::get().min(8))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn from_config_maps_every_setting() {
        let mut config = ShipitConfig::default();
        config.resolve.tree_shake = true;
        config.resolve.search_roots = vec![PathBuf::from("/srv/plugins")];
        config.resolve.fallback_roots = vec![PathBuf::from("/opt/node")];
        config.resolve.excluded_modules = vec!["sharp".to_string()];
        config.resolve.tree_shake_entries = vec!["renderPage".to_string()];
        config.package.build_python_source = true;
        config.package.compression_level = 9;

        let options = PackOptions::from_config(&config);
        assert!(options.resolve.tree_shake);
        assert_eq!(options.resolve.search_roots, vec![PathBuf::from("/srv/plugins")]);
        assert_eq!(options.resolve.fallback_roots, vec![PathBuf::from("/opt/node")]);
        assert!(options.resolve.is_excluded("sharp"));
        assert!(!options.resolve.is_excluded("aws-sdk"));
        assert!(options.resolve.tree_shake_trigger.triggers("./renderPage"));
        assert!(options.build_python_source);
        assert_eq!(options.compression_level, 9);
    }

    #[test]
    fn parallelism_is_never_zero() {
        assert_eq!(PackOptions::new().with_max_parallel(0).parallelism(), 1);
        assert!(PackOptions::new().parallelism() >= 1);
    }
}
