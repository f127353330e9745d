//! Anchors relative configuration paths at the working directory.

use std::path::{Path, PathBuf};

/// Resolves `path` against the current working directory.
///
/// Absolute and empty paths come back unchanged, and `None` stays `None`.
/// If the working directory cannot be determined the path is returned as is.
pub fn absolute_path(path: Option<&Path>) -> Option<PathBuf> {
    let path = path?;
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Some(path.to_path_buf());
    }
    match std::env::current_dir() {
        Ok(cwd) => Some(cwd.join(path)),
        Err(_) => Some(path.to_path_buf()),
    }
}
