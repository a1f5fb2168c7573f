//! Artifact writing

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::errors::{GenError, Result};

/// Write `contents` to `path` unless it already holds exactly that
///
/// Leaves the modification time alone for unchanged artifacts so build
/// tools do not recompile. Returns whether the file was written.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    match fs::read_to_string(path) {
        Ok(existing) if existing == contents => {
            debug!(path = %path.display(), "artifact unchanged");
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(GenError::Io { path: path.to_path_buf(), source: e }),
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(GenError::io(parent))?;
    }
    fs::write(path, contents).map_err(GenError::io(path))?;
    debug!(path = %path.display(), bytes = contents.len(), "artifact written");
    Ok(true)
}
