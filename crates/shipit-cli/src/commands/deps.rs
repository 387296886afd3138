//! `shipit deps`: print the dependency closure of one entry file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use shipit_bundler::{PackOptions, function::find_module_dir};
use shipit_deps::DependencyResolver;

use crate::cli::DepsArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};

/// Execute the deps command.
pub fn execute(args: DepsArgs) -> Result<()> {
    let cwd = utils::get_cwd()?;
    let config = utils::load_config(&args.resolve, &cwd)?;

    let entry = utils::resolve_path(&args.entry, &cwd);
    if !entry.is_file() {
        return Err(CliError::FileNotFound(entry));
    }
    let base = match &args.base {
        Some(base) => utils::resolve_path(base, &cwd),
        None => default_base(&entry),
    };

    let options = PackOptions::from_config(&config).resolve;
    let resolution = DependencyResolver::new(options).resolve(&entry, &base)?;

    let mut stdout = io::stdout().lock();
    for file in &resolution.files {
        writeln!(stdout, "{}", file.display())?;
    }
    stdout.flush()?;

    tracing::debug!(
        files = resolution.files.len(),
        packages = resolution.module_names.len(),
        "printed dependency closure"
    );
    Ok(())
}

/// Nearest directory above `entry` with a package.json, else its directory.
fn default_base(entry: &Path) -> PathBuf {
    let dir = entry.parent().map(Path::to_path_buf).unwrap_or_default();
    find_module_dir(&dir).unwrap_or(dir)
}
