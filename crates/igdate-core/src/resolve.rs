use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use walkdir::WalkDir;

/// Find the first regular file named `filename` anywhere under `root`.
///
/// Directories are walked depth-first with entries sorted by name, so when
/// the same name exists in several subdirectories the lexicographically
/// first path wins. Symlinked files match like regular files; unreadable
/// subdirectories are skipped.
pub fn find_file(root: &Path, filename: &str) -> anyhow::Result<Option<PathBuf>> {
    std::fs::read_dir(root).with_context(|| format!("Cannot read media directory {}", root.display()))?;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.file_name() == filename && entry.path().is_file() {
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}
