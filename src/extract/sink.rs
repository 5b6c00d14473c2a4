//! Filesystem sink for decoded media payloads.

use std::path::{Path, PathBuf};

use crate::error::{MmsError, Result};

/// Write one decoded payload into `dir`, creating the directory first.
///
/// Overwrites silently: filenames are deterministic, so re-running an
/// extraction rewrites the same files rather than accumulating copies.
/// Returns the final path of the written file.
pub fn save_media_file(bytes: &[u8], dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| MmsError::io(dir, e))?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|e| MmsError::io(&path, e))?;
    Ok(path)
}
