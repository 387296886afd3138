//! Archive sinks.
//!
//! Packaging code only talks to [`ArchiveSink`]. [`ZipArchive`] is the
//! deflate-backed implementation written to disk.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Datelike, Timelike, Utc};
use rustc_hash::FxHashSet;
use tracing::{trace, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, Result};

/// Mode of generated entries and of files on platforms without unix modes.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Destination of packaged files.
///
/// Entry names use `/` separators. Adding a name twice keeps the first entry.
pub trait ArchiveSink {
    /// Add the contents of `source` under `entry_name`.
    fn add_file(
        &mut self,
        source: &Path,
        entry_name: &str,
        mode: u32,
        modified: SystemTime,
    ) -> Result<()>;

    /// Add an in-memory entry.
    fn add_content(&mut self, entry_name: &str, content: &[u8]) -> Result<()>;

    /// Flush the archive and return its path.
    fn finalize(self) -> Result<PathBuf>
    where
        Self: Sized;
}

/// Add `source` with its own mode and modification time.
pub fn add_path(sink: &mut dyn ArchiveSink, source: &Path, entry_name: &str) -> Result<()> {
    let metadata = fs::metadata(source).map_err(|e| PackError::io(source, e))?;
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    sink.add_file(source, entry_name, file_mode(&metadata), modified)
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> u32 {
    DEFAULT_FILE_MODE
}

/// A zip file on disk.
pub struct ZipArchive {
    path: PathBuf,
    writer: ZipWriter<File>,
    compression_level: u8,
    entries: FxHashSet<String>,
}

impl std::fmt::Debug for ZipArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("path", &self.path)
            .field("compression_level", &self.compression_level)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ZipArchive {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: impl Into<PathBuf>, compression_level: u8) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| PackError::io(&path, e))?;
        Ok(Self {
            path,
            writer: ZipWriter::new(file),
            compression_level,
            entries: FxHashSet::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn options(&self, mode: u32, modified: Option<SystemTime>) -> SimpleFileOptions {
        let options = if self.compression_level == 0 {
            SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
        } else {
            SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(self.compression_level)))
        };
        let timestamp = modified.and_then(zip_timestamp).unwrap_or_default();
        options.unix_permissions(mode).last_modified_time(timestamp)
    }

    /// Register `entry_name`, returning false if it is already present.
    fn claim(&mut self, entry_name: &str) -> bool {
        if self.entries.insert(entry_name.to_string()) {
            return true;
        }
        warn!(
            archive = %self.path.display(),
            entry = entry_name,
            "duplicate archive entry skipped"
        );
        false
    }
}

impl ArchiveSink for ZipArchive {
    fn add_file(
        &mut self,
        source: &Path,
        entry_name: &str,
        mode: u32,
        modified: SystemTime,
    ) -> Result<()> {
        if !self.claim(entry_name) {
            return Ok(());
        }
        trace!(entry = entry_name, source = %source.display(), "adding file");

        let options = self.options(mode, Some(modified));
        let mut reader = File::open(source).map_err(|e| PackError::io(source, e))?;
        self.writer.start_file(entry_name, options)?;
        io::copy(&mut reader, &mut self.writer).map_err(|e| PackError::io(source, e))?;
        Ok(())
    }

    fn add_content(&mut self, entry_name: &str, content: &[u8]) -> Result<()> {
        if !self.claim(entry_name) {
            return Ok(());
        }

        let options = self.options(DEFAULT_FILE_MODE, None);
        self.writer.start_file(entry_name, options)?;
        io::Write::write_all(&mut self.writer, content).map_err(|e| PackError::io(&self.path, e))?;
        Ok(())
    }

    fn finalize(self) -> Result<PathBuf> {
        self.writer.finish()?;
        Ok(self.path)
    }
}

/// Zip timestamps cover 1980..=2107 at two-second resolution.
fn zip_timestamp(time: SystemTime) -> Option<zip::DateTime> {
    let time: DateTime<Utc> = time.into();
    zip::DateTime::from_date_and_time(
        u16::try_from(time.year()).ok()?,
        u8::try_from(time.month()).ok()?,
        u8::try_from(time.day()).ok()?,
        u8::try_from(time.hour()).ok()?,
        u8::try_from(time.minute()).ok()?,
        u8::try_from(time.second()).ok()?,
    )
    .ok()
}

/// Forward-slash entry name of `path` relative to `base`.
pub fn entry_name(path: &Path, base: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    fn read_back(path: &Path) -> zip::ZipArchive<File> {
        zip::ZipArchive::new(File::open(path).unwrap()).unwrap()
    }

    #[test]
    fn writes_files_and_content() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("handler.js");
        fs::write(&source, "exports.handler = () => 1;\n").unwrap();

        let mut archive = ZipArchive::create(dir.path().join("out.zip"), 6).unwrap();
        add_path(&mut archive, &source, "handler.js").unwrap();
        archive.add_content("meta.json", br#"{"ok":true}"#).unwrap();
        let path = archive.finalize().unwrap();

        let mut zip = read_back(&path);
        let mut names: Vec<&str> = zip.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["handler.js", "meta.json"]);

        let mut content = String::new();
        zip.by_name("handler.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "exports.handler = () => 1;\n");
    }

    #[test]
    fn duplicate_entries_keep_the_first() {
        let dir = TempDir::new().unwrap();
        let mut archive = ZipArchive::create(dir.path().join("out.zip"), 0).unwrap();
        archive.add_content("a.txt", b"first").unwrap();
        archive.add_content("a.txt", b"second").unwrap();
        let path = archive.finalize().unwrap();

        let mut zip = read_back(&path);
        assert_eq!(zip.len(), 1);
        let mut content = String::new();
        zip.by_name("a.txt").unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "first");
    }

    #[cfg(unix)]
    #[test]
    fn keeps_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let source = dir.path().join("bootstrap");
        fs::write(&source, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&source, fs::Permissions::from_mode(0o755)).unwrap();

        let mut archive = ZipArchive::create(dir.path().join("out.zip"), 6).unwrap();
        add_path(&mut archive, &source, "bootstrap").unwrap();
        let path = archive.finalize().unwrap();

        let mut zip = read_back(&path);
        let mode = zip.by_name("bootstrap").unwrap().unix_mode().unwrap();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn timestamps_before_1980_fall_back() {
        assert!(zip_timestamp(SystemTime::UNIX_EPOCH).is_none());
        let recent = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        let stamp = zip_timestamp(recent).unwrap();
        assert_eq!(stamp.year(), 2023);
    }

    #[test]
    fn entry_names_use_forward_slashes() {
        let base = Path::new("/srv/site");
        assert_eq!(
            entry_name(Path::new("/srv/site/node_modules/a/index.js"), base).as_deref(),
            Some("node_modules/a/index.js")
        );
        assert_eq!(entry_name(Path::new("/srv/other/a.js"), base), None);
        assert_eq!(entry_name(base, base), None);
    }
}
