//! Extra runtime files some packages need outside their published set.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::error::Result;
use crate::published::glob_under;

/// One table row: files matching `pattern` under `package_dir/base`.
#[derive(Debug, Clone, Copy)]
struct SideFileRule {
    module: &'static str,
    base: &'static str,
    pattern: &'static str,
}

/// Maintained by hand; keyed by module name.
const SIDE_FILE_RULES: &[SideFileRule] = &[
    // Generated client and query engine binaries live in node_modules/.prisma.
    SideFileRule {
        module: "@prisma/client",
        base: "../../.prisma",
        pattern: "**/*",
    },
];

/// Additional files required by `module_name` installed at `package_dir`.
///
/// Empty for modules without a table entry or whose side directory is absent.
pub fn side_files(package_dir: &Path, module_name: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for rule in SIDE_FILE_RULES.iter().filter(|rule| rule.module == module_name) {
        let base = package_dir.join(rule.base).clean();
        if !base.is_dir() {
            continue;
        }
        files.extend(
            glob_under(&base, rule.pattern)?
                .into_iter()
                .filter(|path| path.is_file()),
        );
    }

    files.sort();
    files.dedup();
    Ok(files)
}
