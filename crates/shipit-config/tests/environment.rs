//! Environment variable overrides
//!
//! Kept in its own test binary: the jail sets process-wide variables.

use shipit_config::ConfigDiscovery;
use std::path::PathBuf;

#[test]
fn environment_overrides_files() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("shipit.toml", "[resolve]\ntree_shake = false\n")?;
        jail.set_env("SHIPIT_RESOLVE__TREE_SHAKE", "true");
        jail.set_env("SHIPIT_PACKAGE__COMPRESSION_LEVEL", 3);

        let config = ConfigDiscovery::new(jail.directory())
            .load()
            .map_err(|e| e.to_string())?;

        assert!(config.resolve.tree_shake);
        assert_eq!(config.package.compression_level, 3);
        assert_eq!(config.resolve.search_roots, Vec::<PathBuf>::new());
        Ok(())
    });
}
