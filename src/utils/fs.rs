//! File system utilities

use std::path::Path;

/// Formats a repository path for display.
///
/// Relative paths are taken from the root's parent so the root's own name stays
/// visible (`code/foo` for root `~/code`). Falls back to the absolute path when
/// the repository is not below the root.
pub fn display_path(path: &Path, root: &Path, full_path: bool) -> String {
    if full_path {
        return path.display().to_string();
    }
    let base = root.parent().unwrap_or(root);
    match path.strip_prefix(base) {
        Ok(relative) if !relative.as_os_str().is_empty() => relative.display().to_string(),
        _ => path.display().to_string(),
    }
}
