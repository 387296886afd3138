//! # shipit-bundler
//!
//! Turns a directory of serverless functions into deployable zip archives.
//!
//! Every top-level entry of the functions directory is dispatched on its
//! shape:
//!
//! | entry | runtime | archive |
//! |---|---|---|
//! | `*.zip` | `js` | copied as-is |
//! | `<name>/<name>.py` (opt-in) | `py` | whole directory |
//! | directory or `*.js` | `js` | function tree plus dependency closure |
//! | Go ELF executable | `go` | the binary alone |
//!
//! Produced archives carry a `shipit-toolchain` entry naming the runtime.
//!
//! ```no_run
//! use shipit_bundler::{PackOptions, zip_functions};
//! use std::path::Path;
//!
//! # async fn run() -> shipit_bundler::Result<()> {
//! let report = zip_functions(Path::new("functions"), Path::new("dist"), PackOptions::new()).await?;
//! for function in &report.packaged {
//!     println!("{} -> {}", function.name, function.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod batch;
pub mod binary;
pub mod error;
pub mod function;
pub mod node;
pub mod options;
pub mod python;
pub mod runtime;
pub mod toolchain;

pub use archive::{ArchiveSink, ZipArchive};
pub use batch::{BatchReport, FunctionFailure, PackagedFunction, zip_function, zip_functions};
pub use error::{PackError, Result};
pub use function::{FunctionKind, FunctionSource, detect, discover_functions};
pub use node::{NodeFiles, list_node_files};
pub use options::PackOptions;
pub use runtime::Runtime;
pub use toolchain::TOOLCHAIN_ENTRY;
