use std::path::Path;

use log::{debug, error, info, warn};

use crate::image_meta;
use crate::markup::{self, MediaFact};
use crate::resolve;
use crate::timestamp;
use crate::ProcessCounters;

/// Run one export page against its media directory.
///
/// Facts are handled one at a time in document order. A failure on one file
/// is logged and never stops the rest of the page.
pub fn process_document(html_path: &Path, media_root: &Path) -> ProcessCounters {
    info!("Processing {}...", html_path.display());

    let extraction = match markup::extract_facts(html_path) {
        Ok(extraction) => extraction,
        Err(e) => {
            error!("Error: {}", e);
            return ProcessCounters::default();
        }
    };
    info!(
        "Found {} files in HTML out of {} total links.",
        extraction.facts.len(),
        extraction.total_entries
    );

    let mut counters = ProcessCounters {
        total_entries: extraction.total_entries,
        ..ProcessCounters::default()
    };

    if extraction.facts.is_empty() {
        warn!("No file-date pairs found. Skipping.");
        return counters;
    }

    for fact in &extraction.facts {
        debug!("Processing {} with date {}...", fact.filename, fact.captured_at);
        if let Err(e) = process_fact(fact, media_root, &mut counters) {
            error!("Error processing file {}: {:#}", fact.filename, e);
        }
    }

    counters
}

fn process_fact(
    fact: &MediaFact,
    media_root: &Path,
    counters: &mut ProcessCounters,
) -> anyhow::Result<()> {
    let Some(path) = resolve::find_file(media_root, &fact.filename)? else {
        warn!("File {} not found in the directory", fact.filename);
        counters.files_not_found += 1;
        return Ok(());
    };
    counters.files_processed += 1;

    let applied = timestamp::apply_timestamp(&path, &fact.captured_at);
    if !applied.success {
        return Ok(());
    }
    counters.files_updated += 1;

    if image_meta::supports_exif(&applied.path)
        && !image_meta::apply_exif(&applied.path, &fact.captured_at)
    {
        warn!("Failed to update EXIF for {}", applied.path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::exif::{read_embedded_date, EmbeddedDate};
    use chrono::NaiveDateTime;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn entry(media: &str, date_taken: &str) -> String {
        format!(
            r#"<div class="pam _3-95 _2ph- _a6-g uiBoxWhite noborder"><div class="_3-95 _a6-p">{media}
<div class="_a6-q">Date taken</div><div class="_a6-q">{date_taken}</div></div></div>"#
        )
    }

    /// Export layout with `content/posts_1.html` and a `media/posts/<sub>` tree.
    fn fixture(entries: &[String]) -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let html = dir.path().join("content").join("posts_1.html");
        let media = dir.path().join("media").join("posts");
        fs::create_dir_all(html.parent().unwrap()).unwrap();
        fs::create_dir_all(media.join("202303")).unwrap();
        fs::write(&html, format!("<html><body>{}</body></html>", entries.concat())).unwrap();
        (dir, html, media)
    }

    fn counters(total: u64, processed: u64, updated: u64, not_found: u64) -> ProcessCounters {
        ProcessCounters {
            total_entries: total,
            files_processed: processed,
            files_updated: updated,
            files_not_found: not_found,
        }
    }

    #[test]
    fn test_photo_dated_renamed_and_tagged() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<img src="media/posts/202303/photo1.jpg">"#,
            "March 4, 2023, 10:15 AM",
        )]);
        image::RgbImage::new(8, 8)
            .save(media.join("202303").join("photo1.jpg"))
            .unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 1, 1, 0));

        let renamed = media.join("202303").join("20230304_101500.jpg");
        assert!(renamed.exists());
        assert!(!media.join("202303").join("photo1.jpg").exists());
        let expected = NaiveDateTime::parse_from_str("2023-03-04 10:15:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(read_embedded_date(&renamed).unwrap(), EmbeddedDate::Present(Some(expected)));
    }

    #[test]
    fn test_missing_media_file() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<img src="media/posts/202303/ghost.jpg">"#,
            "March 4, 2023, 10:15 AM",
        )]);
        fs::write(media.join("202303").join("other.jpg"), b"x").unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 0, 0, 1));
        assert!(media.join("202303").join("other.jpg").exists());
    }

    #[test]
    fn test_unparsable_date_counts_entry_only() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<img src="media/posts/202303/photo1.jpg">"#,
            "the day after the party",
        )]);
        fs::write(media.join("202303").join("photo1.jpg"), b"x").unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 0, 0, 0));
        assert!(media.join("202303").join("photo1.jpg").exists());
    }

    #[test]
    fn test_video_renamed_without_exif() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<video src="media/posts/202303/clip.MP4"></video>"#,
            "Jan 20, 2021 3:45 pm",
        )]);
        fs::write(media.join("202303").join("clip.MP4"), b"video bytes").unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 1, 1, 0));
        let renamed = media.join("202303").join("20210120_154500.MP4");
        assert_eq!(fs::read(renamed).unwrap(), b"video bytes");
    }

    #[test]
    fn test_corrupt_exif_still_counts_as_updated() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<img src="media/posts/202303/broken.jpg">"#,
            "March 4, 2023, 10:15 AM",
        )]);
        let bogus = b"\xFF\xD8\xFF\xE1\x00\x10Exif\0\0notatiff\xFF\xD9".to_vec();
        fs::write(media.join("202303").join("broken.jpg"), &bogus).unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 1, 1, 0));
        let renamed = media.join("202303").join("20230304_101500.jpg");
        assert_eq!(fs::read(renamed).unwrap(), bogus);
    }

    #[test]
    fn test_second_run_does_not_match_renamed_files() {
        let (_dir, html, media) = fixture(&[entry(
            r#"<video src="media/posts/202303/clip.mp4"></video>"#,
            "Jan 20, 2021 3:45 pm",
        )]);
        fs::write(media.join("202303").join("clip.mp4"), b"v").unwrap();

        assert_eq!(process_document(&html, &media), counters(1, 1, 1, 0));
        assert_eq!(process_document(&html, &media), counters(1, 0, 0, 1));
        assert!(media.join("202303").join("20210120_154500.mp4").exists());
    }

    #[test]
    fn test_one_failure_does_not_stop_the_page() {
        let (_dir, html, media) = fixture(&[
            entry(r#"<video src="a/first.mp4"></video>"#, "Jan 20, 2021 3:45 pm"),
            entry(r#"<video src="a/second.mp4"></video>"#, "Jan 20, 2021 3:45 pm"),
            entry(r#"<video src="a/third.mp4"></video>"#, "Jan 21, 2021 3:45 pm"),
        ]);
        for name in ["first.mp4", "second.mp4", "third.mp4"] {
            fs::write(media.join("202303").join(name), name).unwrap();
        }

        // second.mp4 collides with the name first.mp4 was given.
        assert_eq!(process_document(&html, &media), counters(3, 3, 2, 0));
        let dir = media.join("202303");
        assert_eq!(fs::read(dir.join("20210120_154500.mp4")).unwrap(), b"first.mp4");
        assert_eq!(fs::read(dir.join("second.mp4")).unwrap(), b"second.mp4");
        assert_eq!(fs::read(dir.join("20210121_154500.mp4")).unwrap(), b"third.mp4");
    }

    #[test]
    fn test_missing_document_yields_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(
            process_document(&dir.path().join("nope.html"), dir.path()),
            ProcessCounters::default()
        );
    }

    #[test]
    fn test_unreadable_media_root_is_absorbed_per_fact() {
        let (dir, html, _media) = fixture(&[entry(
            r#"<img src="media/posts/202303/photo1.jpg">"#,
            "March 4, 2023, 10:15 AM",
        )]);
        let missing_root = dir.path().join("media").join("stories");

        assert_eq!(process_document(&html, &missing_root), counters(1, 0, 0, 0));
    }
}
