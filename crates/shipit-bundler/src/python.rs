//! Python source functions: the whole directory, as-is.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::archive::{ArchiveSink, ZipArchive, add_path, entry_name};
use crate::error::{PackError, Result};
use crate::runtime::Runtime;
use crate::toolchain::add_toolchain_file;

pub fn zip_python_function(dir: &Path, archive_path: &Path, compression_level: u8) -> Result<PathBuf> {
    let mut archive = ZipArchive::create(archive_path, compression_level)?;

    let walker = WalkDir::new(dir).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
            PackError::io(path, err.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(name) = entry_name(entry.path(), dir) {
            add_path(&mut archive, entry.path(), &name)?;
        }
    }

    add_toolchain_file(&mut archive, Runtime::Py)?;
    archive.finalize()
}
