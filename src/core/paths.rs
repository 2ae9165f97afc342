//! Path helpers

use std::path::Path;

/// Normalize a path to use '/' as separator
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to `base`, falling back to the path itself
pub fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(normalize_path)
        .unwrap_or_else(|_| normalize_path(path))
}

/// File extension including the leading dot, or "" when there is none.
///
/// Dotfiles such as `.bashrc` have no extension.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
