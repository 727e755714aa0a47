//! Crash-safe file replacement.
//!
//! Writes go to a synced temp file in the target directory and are then
//! renamed over the target. Windows refuses to rename over an existing file,
//! so the old contents are moved to `.bak` first and restored on failure.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn parent_or_cwd(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Replace `path` with `bytes`; readers see either the old or the new contents.
pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();

    let mut tmp = NamedTempFile::new_in(parent_or_cwd(path))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    let Err(err) = tmp.persist(path) else {
        return Ok(());
    };
    if !path.exists() {
        return Err(err.error);
    }

    let backup_path = path.with_extension("bak");
    let _ = fs::remove_file(&backup_path);
    fs::rename(path, &backup_path)?;
    if let Err(rename_err) = err.file.persist(path) {
        let _ = fs::rename(&backup_path, path);
        return Err(rename_err.error);
    }
    if let Err(e) = fs::remove_file(&backup_path) {
        tracing::warn!(
            path = %backup_path.display(),
            "Failed to remove .bak after atomic write: {e}"
        );
    }
    Ok(())
}
