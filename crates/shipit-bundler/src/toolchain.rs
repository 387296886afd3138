//! Toolchain metadata entry.

use serde::Serialize;

use crate::archive::ArchiveSink;
use crate::error::Result;
use crate::runtime::Runtime;

/// Name of the metadata entry added to produced archives.
pub const TOOLCHAIN_ENTRY: &str = "shipit-toolchain";

#[derive(Debug, Serialize)]
struct Toolchain {
    runtime: Runtime,
}

/// Record which runtime built the archive.
pub fn add_toolchain_file(sink: &mut dyn ArchiveSink, runtime: Runtime) -> Result<()> {
    let payload = serde_json::to_vec(&Toolchain { runtime })?;
    sink.add_content(TOOLCHAIN_ENTRY, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::SystemTime;

    #[derive(Default)]
    struct MemorySink {
        entries: Vec<(String, Vec<u8>)>,
    }

    impl ArchiveSink for MemorySink {
        fn add_file(&mut self, _: &Path, _: &str, _: u32, _: SystemTime) -> Result<()> {
            unreachable!("toolchain writes content only")
        }

        fn add_content(&mut self, entry_name: &str, content: &[u8]) -> Result<()> {
            self.entries.push((entry_name.to_string(), content.to_vec()));
            Ok(())
        }

        fn finalize(self) -> Result<PathBuf> {
            Ok(PathBuf::new())
        }
    }

    #[test]
    fn writes_runtime_json() {
        let mut sink = MemorySink::default();
        add_toolchain_file(&mut sink, Runtime::Go).unwrap();
        assert_eq!(sink.entries.len(), 1);
        assert_eq!(sink.entries[0].0, TOOLCHAIN_ENTRY);
        assert_eq!(sink.entries[0].1, br#"{"runtime":"go"}"#.to_vec());
    }
}
