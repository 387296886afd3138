//! Packaging every function of a directory.
//!
//! Functions are packaged concurrently, each on its own blocking task,
//! bounded by a semaphore. Node functions share one
//! [`DependencyResolver`] so package manifests are parsed once per batch,
//! while each resolution still runs with fresh traversal state. A failing
//! function is reported and does not stop its siblings.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use shipit_deps::DependencyResolver;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, info};

use crate::binary::zip_binary;
use crate::error::{PackError, Result};
use crate::function::{FunctionKind, FunctionSource, discover_functions};
use crate::node::zip_node_function;
use crate::options::PackOptions;
use crate::python::zip_python_function;
use crate::runtime::Runtime;

/// A successfully produced archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagedFunction {
    pub name: String,
    pub path: PathBuf,
    pub runtime: Runtime,
}

/// A function that could not be packaged.
#[derive(Debug)]
pub struct FunctionFailure {
    pub name: String,
    pub error: PackError,
}

/// Outcome of [`zip_functions`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Sorted by name.
    pub packaged: Vec<PackagedFunction>,
    /// Sorted by name.
    pub failures: Vec<FunctionFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Package one function into `dest`.
pub fn zip_function(
    function: &FunctionSource,
    dest: &Path,
    resolver: &DependencyResolver,
    options: &PackOptions,
) -> Result<PackagedFunction> {
    let archive_path = function.archive_path(dest);
    let level = options.compression_level;

    let path = match function.kind {
        FunctionKind::Archive => {
            fs::copy(&function.path, &archive_path).map_err(|e| PackError::io(&function.path, e))?;
            archive_path
        }
        FunctionKind::Node => zip_node_function(&function.path, &archive_path, resolver, level)?,
        FunctionKind::Go => zip_binary(&function.path, &archive_path, Runtime::Go, level)?,
        FunctionKind::Python => zip_python_function(&function.path, &archive_path, level)?,
    };

    debug!(function = %function.name, archive = %path.display(), "packaged function");
    Ok(PackagedFunction {
        name: function.name.clone(),
        path,
        runtime: function.runtime(),
    })
}

/// Package every function found in `src_dir` into `dest_dir`.
///
/// Fails only when the directories themselves are unusable; per-function
/// errors are collected in the report.
pub async fn zip_functions(
    src_dir: &Path,
    dest_dir: &Path,
    options: PackOptions,
) -> Result<BatchReport> {
    let functions = discover_functions(src_dir, options.build_python_source)?;
    fs::create_dir_all(dest_dir).map_err(|e| PackError::io(dest_dir, e))?;

    info!(
        functions = functions.len(),
        src = %src_dir.display(),
        dest = %dest_dir.display(),
        "packaging functions"
    );

    let resolver = Arc::new(DependencyResolver::new(options.resolve.clone()));
    let semaphore = Arc::new(Semaphore::new(options.parallelism()));
    let options = Arc::new(options);
    let dest_dir = Arc::new(dest_dir.to_path_buf());

    let mut join_set = JoinSet::new();
    for function in functions {
        let resolver = Arc::clone(&resolver);
        let semaphore = Arc::clone(&semaphore);
        let options = Arc::clone(&options);
        let dest_dir = Arc::clone(&dest_dir);

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let name = function.name.clone();
            let result = task::spawn_blocking(move || {
                zip_function(&function, &dest_dir, &resolver, &options)
            })
            .await
            .unwrap_or_else(|join_err| Err(PackError::TaskFailed(join_err.to_string())));
            (name, result)
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = join_set.join_next().await {
        let (name, result) = match joined {
            Ok(outcome) => outcome,
            Err(join_err) => (
                "unknown".to_string(),
                Err(PackError::TaskFailed(join_err.to_string())),
            ),
        };
        match result {
            Ok(packaged) => report.packaged.push(packaged),
            Err(error) => report.failures.push(FunctionFailure { name, error }),
        }
    }

    report.packaged.sort_by(|a, b| a.name.cmp(&b.name));
    report.failures.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(report)
}
