//! Go executables.
//!
//! A file is treated as a Go function when it is an ELF image carrying the
//! `.note.go.buildid` section the Go linker emits. Such a binary is shipped
//! alone under its own file name.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use object::{BinaryFormat, Object};
use tracing::debug;

use crate::archive::{ArchiveSink, ZipArchive, add_path};
use crate::error::{PackError, Result};
use crate::runtime::Runtime;
use crate::toolchain::add_toolchain_file;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

const GO_BUILD_ID_SECTION: &str = ".note.go.buildid";

/// Whether `path` is a Go-built ELF executable.
///
/// Unreadable or malformed files are simply not Go executables.
pub fn is_go_executable(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    let has_magic = File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .is_ok();
    if !has_magic || magic != ELF_MAGIC {
        return false;
    }

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(_) => return false,
    };
    match object::File::parse(&*data) {
        Ok(file) => {
            file.format() == BinaryFormat::Elf && file.section_by_name(GO_BUILD_ID_SECTION).is_some()
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "not a parseable ELF file");
            false
        }
    }
}

/// Zip a single binary under its file name.
pub fn zip_binary(
    binary: &Path,
    archive_path: &Path,
    runtime: Runtime,
    compression_level: u8,
) -> Result<PathBuf> {
    let file_name = binary
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            PackError::io(
                binary,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "binary has no file name"),
            )
        })?;

    let mut archive = ZipArchive::create(archive_path, compression_level)?;
    add_path(&mut archive, binary, &file_name)?;
    add_toolchain_file(&mut archive, runtime)?;
    archive.finalize()
}
