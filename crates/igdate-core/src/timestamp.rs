use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use filetime::FileTime;
use log::{error, info};

use crate::date::CapturedAt;

/// Outcome of rewriting a file's OS timestamps and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// Renamed path on success, the original path otherwise.
    pub path: PathBuf,
    pub success: bool,
}

/// Set access, modification and (where supported) creation time of `path` to
/// the capture time, then rename it to `YYYYMMDD_HHMMSS` plus its original
/// extension.
///
/// Failures are logged and reported as `success: false`. Steps that already
/// succeeded are not undone.
pub fn apply_timestamp(path: &Path, captured_at: &CapturedAt) -> Applied {
    match try_apply(path, captured_at) {
        Ok(new_path) => {
            info!(
                "Successfully updated {} to {} with date {}",
                path.display(),
                new_path.display(),
                captured_at
            );
            Applied {
                path: new_path,
                success: true,
            }
        }
        Err(e) => {
            error!("Error updating {}: {:#}", path.display(), e);
            Applied {
                path: path.to_path_buf(),
                success: false,
            }
        }
    }
}

fn try_apply(path: &Path, captured_at: &CapturedAt) -> anyhow::Result<PathBuf> {
    let secs = captured_at
        .unix_timestamp()
        .with_context(|| format!("{} does not exist in the local time zone", captured_at))?;
    let ft = FileTime::from_unix_time(secs, 0);

    filetime::set_file_times(path, ft, ft)
        .with_context(|| format!("Failed to set file times on {}", path.display()))?;
    set_creation_time(path, secs)?;

    let new_path = path.with_file_name(canonical_file_name(path, captured_at));
    if new_path == path {
        return Ok(new_path);
    }
    if new_path.exists() {
        bail!("{} already exists", new_path.display());
    }
    fs::rename(path, &new_path)
        .with_context(|| format!("Failed to rename to {}", new_path.display()))?;

    Ok(new_path)
}

/// `YYYYMMDD_HHMMSS` followed by the original extension, untouched.
pub fn canonical_file_name(path: &Path, captured_at: &CapturedAt) -> String {
    let stem = captured_at.canonical_stem();
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

#[cfg(any(windows, target_os = "macos"))]
fn set_creation_time(path: &Path, secs: i64) -> anyhow::Result<()> {
    use std::fs::{FileTimes, OpenOptions};
    use std::time::{Duration, UNIX_EPOCH};

    #[cfg(target_os = "macos")]
    use std::os::macos::fs::FileTimesExt;
    #[cfg(windows)]
    use std::os::windows::fs::FileTimesExt;

    let offset = Duration::from_secs(secs.unsigned_abs());
    let created = if secs >= 0 {
        UNIX_EPOCH + offset
    } else {
        UNIX_EPOCH - offset
    };

    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for creation time", path.display()))?;
    file.set_times(FileTimes::new().set_created(created))
        .with_context(|| format!("Failed to set creation time on {}", path.display()))?;
    Ok(())
}

// No settable birth time here; the modification time stands in for it.
#[cfg(not(any(windows, target_os = "macos")))]
fn set_creation_time(path: &Path, _secs: i64) -> anyhow::Result<()> {
    log::trace!("Creation time not settable on this platform, skipping {}", path.display());
    Ok(())
}
