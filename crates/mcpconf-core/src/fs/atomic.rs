//! Atomic file replacement.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write `content` to `path` atomically.
///
/// The content goes to a temporary file in the same directory as `path`
/// (so the final rename never crosses filesystems), is flushed to disk, and
/// is then renamed over the destination. If anything fails before the
/// rename the destination is left untouched. The temporary file is removed
/// on every failure path.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_with(path, content, |_| Ok(()))
}

/// `write_atomic` with a hook that runs after the temporary file is fully
/// written and before it is renamed into place.
fn write_atomic_with<F>(path: &Path, content: &[u8], before_rename: F) -> Result<()>
where
    F: FnOnce(&Path) -> std::io::Result<()>,
{
    let dir = parent_dir(path);
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

    let mut temp = tempfile::Builder::new()
        .prefix(".mcpconf-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| Error::io(&dir, e))?;

    // Keep the destination's mode; temp files are created owner-only.
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| Error::io(temp.path(), e))?;
    }

    temp.write_all(content)
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.flush().map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(temp.path(), e))?;

    before_rename(temp.path()).map_err(|e| Error::io(temp.path(), e))?;

    temp.persist(path).map_err(|e| Error::io(path, e.error))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file atomically");
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
