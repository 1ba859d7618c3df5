use std::path::{Component, Path, PathBuf};
use crate::utils::{ProcessError, ProcessResult};

/// Create the parent directory of `path` (and its ancestors) if missing
pub fn ensure_parent_dir(path: impl AsRef<Path>) -> ProcessResult<()> {
    let Some(parent) = path.as_ref().parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|source| ProcessError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })
}

/// Make `path` absolute without touching the filesystem.
///
/// `.` and `..` components are folded lexically, so `/a/b/..` becomes `/a`.
/// Falls back to the path as given if the current directory is unavailable.
pub fn absolutize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut folded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            // `..` above the root stays at the root
            Component::ParentDir => {
                if !folded.pop() && !folded.has_root() {
                    folded.push(component);
                }
            }
            other => folded.push(other),
        }
    }
    folded
}

/// File name of `path` for log lines
pub fn extract_filename(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}
