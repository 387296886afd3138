//! Import specifier classification and package-name extraction.

use std::path::Path;

/// Kind of an import specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    /// `./x`, `../x`, `.`, `..` or an absolute path.
    Relative,
    /// A package name, optionally scoped and optionally followed by a sub-path.
    Bare,
}

/// Classify a specifier as relative or bare.
pub fn classify(specifier: &str) -> SpecifierKind {
    if specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with(".\\")
        || specifier.starts_with("..\\")
        || Path::new(specifier).is_absolute()
    {
        SpecifierKind::Relative
    } else {
        SpecifierKind::Bare
    }
}

/// Extract the package name from a bare import specifier.
///
/// - `lodash` -> `lodash`
/// - `lodash/fp` -> `lodash`
/// - `@babel/core/lib/index` -> `@babel/core`
///
/// Returns `None` when the specifier names no installable package: the empty
/// string, a bare scope (`@babel`, `@babel/`), or a name starting with a
/// path marker. Backslashes are treated as separators.
///
/// ```
/// # use shipit_deps::module_name::package_name;
/// assert_eq!(package_name("@babel/core/lib/index"), Some("@babel/core"));
/// assert_eq!(package_name("lodash/fp"), Some("lodash"));
/// assert_eq!(package_name("@babel"), None);
/// ```
pub fn package_name(specifier: &str) -> Option<&str> {
    if specifier.is_empty() || specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }

    let is_separator = |c: char| c == '/' || c == '\\';

    let end = if specifier.starts_with('@') {
        let scope_end = specifier.find(is_separator)?;
        if scope_end == 1 {
            return None;
        }
        let rest = &specifier[scope_end + 1..];
        let name_len = rest.find(is_separator).unwrap_or(rest.len());
        if name_len == 0 {
            return None;
        }
        scope_end + 1 + name_len
    } else {
        specifier.find(is_separator).unwrap_or(specifier.len())
    };

    Some(&specifier[..end])
}

/// Sub-path of a bare specifier after its package name, if any.
///
/// `@scope/pkg/lib/x.js` -> `Some("lib/x.js")`, `pkg` -> `None`.
pub fn sub_path(specifier: &str) -> Option<&str> {
    let name = package_name(specifier)?;
    let rest = specifier[name.len()..].trim_start_matches(['/', '\\']);
    (!rest.is_empty()).then_some(rest)
}

/// Specifier with backslash separators rewritten to `/`.
pub(crate) fn normalize_separators(specifier: &str) -> String {
    specifier.replace('\\', "/")
}
