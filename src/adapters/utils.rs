//! Shared file helpers for the file-backed adapters.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` via a sibling temp file and rename, so a
/// crash leaves either the old or the new file, never a torn one.
pub(super) fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)
}
