use std::path::Path;

use log::{info, warn};

use crate::config::Config;
use crate::process::process_document;
use crate::ProcessCounters;

/// Totals for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub totals: ProcessCounters,
    pub documents_processed: u64,
    /// Pages skipped because the page or its media folder is missing.
    pub documents_skipped: u64,
}

/// Process every configured page under `base_dir`, in configuration order,
/// and log an overall summary.
pub fn run_batch(base_dir: &Path, config: &Config) -> BatchSummary {
    let content_dir = base_dir.join(&config.content_dir);
    let media_dir = base_dir.join(&config.media_dir);
    let mut summary = BatchSummary::default();

    for source in &config.html_files {
        let html_path = content_dir.join(&source.html_file);
        let media_root = media_dir.join(&source.media_folder);

        if !html_path.is_file() || !media_root.is_dir() {
            warn!(
                "Skipping {} as either HTML file or media directory not found.",
                source.html_file
            );
            summary.documents_skipped += 1;
            continue;
        }

        summary.totals += process_document(&html_path, &media_root);
        summary.documents_processed += 1;
    }

    log_summary(&summary);
    summary
}

fn log_summary(summary: &BatchSummary) {
    let totals = &summary.totals;
    info!("Overall Processing Summary:");
    info!("Total links in all HTML files: {}", totals.total_entries);
    info!("Total files processed: {}", totals.files_processed);
    info!("Total files updated successfully: {}", totals.files_updated);
    info!("Total files not found: {}", totals.files_not_found);
    info!("Total files not updated correctly: {}", totals.files_not_updated());
}
