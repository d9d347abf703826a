//! Embedded EXIF capture dates for raster images.
//!
//! Writing goes through `little_exif`, which only swaps the EXIF segment (JPEG)
//! or chunk (WebP) and leaves the compressed image data alone. Existing EXIF is
//! probed with `kamadak-exif` first so a damaged block is reported instead of
//! being overwritten.

use std::panic;
use std::path::Path;

use anyhow::{anyhow, Context};
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use log::{debug, error, info};

use crate::date::exif::{read_embedded_date, EmbeddedDate};
use crate::date::CapturedAt;

/// Extensions (lowercase) whose EXIF dates get rewritten.
pub const EXIF_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp"];

/// Whether `path` has an extension in [`EXIF_EXTENSIONS`], ignoring case.
pub fn supports_exif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXIF_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
}

/// Write `captured_at` into the DateTime, DateTimeOriginal and
/// DateTimeDigitized fields of the image at `path`, keeping every other tag.
///
/// Returns false for unsupported file types and on any failure.
pub fn apply_exif(path: &Path, captured_at: &CapturedAt) -> bool {
    if !supports_exif(path) {
        info!("Skipping EXIF update for non-supported file type: {}", path.display());
        return false;
    }

    match write_exif_dates(path, captured_at) {
        Ok(()) => {
            info!("Successfully updated EXIF for {}", path.display());
            true
        }
        Err(e) => {
            error!("Error updating EXIF for {}: {:#}", path.display(), e);
            false
        }
    }
}

fn write_exif_dates(path: &Path, captured_at: &CapturedAt) -> anyhow::Result<()> {
    let embedded = read_embedded_date(path)
        .map_err(|e| anyhow!("existing EXIF is unreadable: {}", e))?;

    let mut metadata = match embedded {
        EmbeddedDate::Absent => {
            debug!("No EXIF in {}, starting from an empty block", path.display());
            Metadata::new()
        }
        EmbeddedDate::Present(previous) => {
            if let Some(previous) = previous {
                debug!("{} previously dated {}", path.display(), previous);
            }
            load_metadata(path)?
        }
    };

    let value = captured_at.exif_datetime();
    metadata.set_tag(ExifTag::ModifyDate(value.clone()));
    metadata.set_tag(ExifTag::DateTimeOriginal(value.clone()));
    metadata.set_tag(ExifTag::CreateDate(value));

    // little_exif panics on some container variants instead of returning an error.
    let dest = path.to_path_buf();
    match panic::catch_unwind(panic::AssertUnwindSafe(|| metadata.write_to_file(&dest))) {
        Ok(result) => result.with_context(|| format!("Failed to write EXIF to {}", path.display())),
        Err(_) => Err(anyhow!("unsupported image variant")),
    }
}

fn load_metadata(path: &Path) -> anyhow::Result<Metadata> {
    let source = path.to_path_buf();
    match panic::catch_unwind(move || Metadata::new_from_path(&source)) {
        Ok(result) => result.with_context(|| format!("Failed to load EXIF from {}", path.display())),
        Err(_) => Err(anyhow!("EXIF block could not be decoded")),
    }
}
