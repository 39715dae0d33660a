//! Persisting a downloaded blob.
//!
//! Writes go to a sibling `.part` file which is synced and then renamed over
//! the destination, so a failed run never leaves a half-written output.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::MediaError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `raw_media.bin` → `raw_media.bin.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `data` to `path`, creating parent directories and replacing any
/// existing file. Returns the number of bytes written.
pub fn write_blob(path: &Path, data: &[u8]) -> Result<u64, MediaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MediaError::storage(parent, e))?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(MediaError::storage(&tmp, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(MediaError::storage(path, e));
    }

    tracing::debug!(path = %path.display(), bytes = data.len(), "blob written");
    Ok(data.len() as u64)
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data)?;
    f.sync_all()
}
