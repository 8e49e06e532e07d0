//! Filesystem helpers.

mod atomic;

pub use atomic::write_atomic;

use std::path::Path;

use crate::error::{Error, Result};

/// Read a file, treating a missing file as empty content.
pub fn read_or_empty(path: &Path) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "config file not found, using empty config");
            Ok(Vec::new())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}
