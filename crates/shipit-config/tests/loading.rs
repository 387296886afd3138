//! Tests for layered config loading: defaults, shipit.toml, package.json, environment

use shipit_config::{ConfigDiscovery, ConfigError};
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults_without_any_source() {
    let dir = TempDir::new().unwrap();
    let config = ConfigDiscovery::new(dir.path()).load().unwrap();

    assert!(!config.resolve.tree_shake);
    assert_eq!(config.resolve.excluded_modules, vec!["aws-sdk"]);
    assert_eq!(config.package.compression_level, 6);
}

#[test]
fn loads_shipit_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("shipit.toml"),
        r#"
[resolve]
tree_shake_entries = ["renderPage"]
search_roots = [".plugins"]
excluded_modules = ["aws-sdk", "sharp"]

[package]
build_python_source = true
"#,
    )
    .unwrap();

    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(config.resolve.tree_shake_entries, vec!["renderPage"]);
    assert_eq!(config.resolve.search_roots, vec![dir.path().join(".plugins")]);
    assert_eq!(config.resolve.excluded_modules, vec!["aws-sdk", "sharp"]);
    assert!(config.package.build_python_source);
    assert_eq!(config.package.compression_level, 6);
}

#[test]
fn package_json_field_overrides_toml() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("shipit.toml"),
        "[package]\ncompression_level = 1\nbuild_python_source = true\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "site", "shipit": {"package": {"compression_level": 9}}}"#,
    )
    .unwrap();

    let config = ConfigDiscovery::new(dir.path()).load().unwrap();
    assert_eq!(config.package.compression_level, 9);
    assert!(config.package.build_python_source);
}

#[test]
fn explicit_file_replaces_conventional_one() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("shipit.toml"), "[resolve]\ntree_shake = false\n").unwrap();
    let custom = dir.path().join("ci.toml");
    fs::write(&custom, "[resolve]\ntree_shake = true\n").unwrap();

    let config = ConfigDiscovery::new(dir.path())
        .with_file(&custom)
        .load()
        .unwrap();
    assert!(config.resolve.tree_shake);
}

#[test]
fn invalid_toml_value_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("shipit.toml"),
        "[package]\ncompression_level = \"max\"\n",
    )
    .unwrap();

    let err = ConfigDiscovery::new(dir.path()).load().unwrap_err();
    assert!(matches!(err, ConfigError::Extract(_)));
}
