//! Static listing of the module specifiers a source file imports.
//!
//! The walker only needs `file -> specifiers`; [`ImportLister`] is the seam
//! and [`OxcImportLister`] the default implementation. Files are parsed,
//! never executed.

use std::path::Path;

use once_cell::sync::Lazy;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression, TemplateLiteral,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use oxc_span::SourceType;
use rustc_hash::FxHashSet;

use crate::error::{DepsError, Result};

/// Maximum size of a file handed to the parser (10MB)
const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Extensions the default lister parses; every other file has no imports.
const PARSED_EXTENSIONS: &[&str] = &["js", "cjs", "mjs", "jsx", "ts", "cts", "mts", "tsx"];

/// Lists the import specifiers of one file, in source order.
pub trait ImportLister: Send + Sync {
    fn list_imports(&self, path: &Path) -> Result<Vec<String>>;
}

impl<F> ImportLister for F
where
    F: Fn(&Path) -> Result<Vec<String>> + Send + Sync,
{
    fn list_imports(&self, path: &Path) -> Result<Vec<String>> {
        self(path)
    }
}

/// Import lister backed by the oxc parser.
///
/// Collects static `import` declarations, `export ... from` re-exports,
/// `import("x")` and `require("x")` with string-literal arguments. Type-only
/// imports and node core modules are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OxcImportLister;

impl OxcImportLister {
    pub fn new() -> Self {
        Self
    }
}

impl ImportLister for OxcImportLister {
    fn list_imports(&self, path: &Path) -> Result<Vec<String>> {
        let parsed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PARSED_EXTENSIONS.contains(&ext));
        if !parsed {
            return Ok(Vec::new());
        }

        let metadata = std::fs::metadata(path).map_err(|e| DepsError::io(path, e))?;
        if metadata.len() > MAX_SOURCE_SIZE {
            return Err(DepsError::ImportListing {
                path: path.to_path_buf(),
                reason: format!(
                    "file exceeds maximum size of {}MB",
                    MAX_SOURCE_SIZE / 1024 / 1024
                ),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| DepsError::io(path, e))?;
        let source = String::from_utf8_lossy(&bytes);

        let source_type = SourceType::from_path(path).unwrap_or(SourceType::mjs());
        Ok(list_source_imports(&source, source_type, path))
    }
}

/// Parse `source` and collect its specifiers.
///
/// A JavaScript module that fails to parse is retried as a script, which
/// accepts CommonJS-only syntax such as `with` or legacy octal literals.
/// Whatever the parser recovered is used either way.
pub fn list_source_imports(source: &str, source_type: SourceType, path: &Path) -> Vec<String> {
    let (specifiers, errors) = collect(source, source_type);
    if errors == 0 {
        return specifiers;
    }

    let retry_as_script = !source_type.is_typescript() && source_type.is_module();
    if retry_as_script {
        let (script_specifiers, script_errors) = collect(source, source_type.with_module(false));
        if script_errors < errors {
            tracing::debug!(
                "Parsed {} as a script after {errors} module parse errors",
                path.display()
            );
            return script_specifiers;
        }
    }

    tracing::debug!(
        "{} has {errors} parse errors; using recovered imports",
        path.display()
    );
    specifiers
}

fn collect(source: &str, source_type: SourceType) -> (Vec<String>, usize) {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();

    let mut collector = ImportCollector::default();
    collector.visit_program(&ret.program);

    let errors = ret.errors.len() + usize::from(ret.panicked);
    (collector.specifiers, errors)
}

#[derive(Default)]
struct ImportCollector {
    specifiers: Vec<String>,
    seen: FxHashSet<String>,
}

impl ImportCollector {
    fn push(&mut self, specifier: &str) {
        if specifier.is_empty() || is_builtin(specifier) {
            return;
        }
        if self.seen.insert(specifier.to_string()) {
            self.specifiers.push(specifier.to_string());
        }
    }
}

fn template_literal_value<'s>(template: &'s TemplateLiteral<'_>) -> Option<&'s str> {
    if !template.expressions.is_empty() {
        return None;
    }
    template
        .quasis
        .first()
        .and_then(|quasi| quasi.value.cooked.as_ref())
        .map(|cooked| cooked.as_str())
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        if !it.import_kind.is_type() {
            self.push(it.source.value.as_str());
        }
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        if !it.export_kind.is_type() {
            self.push(it.source.value.as_str());
        }
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            if !it.export_kind.is_type() {
                self.push(source.value.as_str());
            }
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        let specifier = match &it.source {
            Expression::StringLiteral(lit) => Some(lit.value.as_str()),
            Expression::TemplateLiteral(template) => template_literal_value(template),
            _ => None,
        };
        if let Some(specifier) = specifier {
            self.push(specifier);
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if let Expression::Identifier(ident) = &it.callee {
            if ident.name.as_str() == "require" && it.arguments.len() == 1 {
                let specifier = match &it.arguments[0] {
                    Argument::StringLiteral(lit) => Some(lit.value.as_str()),
                    Argument::TemplateLiteral(template) => template_literal_value(template),
                    _ => None,
                };
                if let Some(specifier) = specifier {
                    self.push(specifier);
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

static BUILTIN_MODULES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "assert",
        "async_hooks",
        "buffer",
        "child_process",
        "cluster",
        "console",
        "constants",
        "crypto",
        "dgram",
        "diagnostics_channel",
        "dns",
        "domain",
        "events",
        "fs",
        "http",
        "http2",
        "https",
        "inspector",
        "module",
        "net",
        "os",
        "path",
        "perf_hooks",
        "process",
        "punycode",
        "querystring",
        "readline",
        "repl",
        "stream",
        "string_decoder",
        "sys",
        "timers",
        "tls",
        "trace_events",
        "tty",
        "url",
        "util",
        "v8",
        "vm",
        "wasi",
        "worker_threads",
        "zlib",
    ]
    .into_iter()
    .collect()
});

/// Whether `specifier` names a node core module (`fs`, `fs/promises`, `node:test`).
///
/// A trailing slash (`punycode/`) asks for the userland package of the same
/// name and is never a core module.
pub fn is_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    if specifier.ends_with('/') {
        return false;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    BUILTIN_MODULES.contains(root)
}
