//! Helpers shared by commands.

use std::path::{Path, PathBuf};

use shipit_config::{ConfigDiscovery, ShipitConfig};

use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};

pub(crate) fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(CliError::from)
}

/// `path` made absolute against `root`.
pub(crate) fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Load configuration from `root` and apply command-line overrides.
///
/// Flags win over every configuration source. `--search-root` values are
/// added after the configured roots.
pub(crate) fn load_config(args: &ResolveArgs, root: &Path) -> Result<ShipitConfig> {
    let mut discovery = ConfigDiscovery::new(root);
    if let Some(file) = &args.config {
        discovery = discovery.with_file(resolve_path(file, root));
    }
    let mut config = discovery.load()?;

    if args.tree_shake {
        config.resolve.tree_shake = true;
    }
    config.resolve.search_roots.extend(
        args.search_roots
            .iter()
            .map(|search_root| resolve_path(search_root, root)),
    );

    tracing::debug!(?config, "effective configuration");
    Ok(config)
}
