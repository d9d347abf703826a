pub mod batch;
pub mod config;
pub mod date;
pub mod image_meta;
pub mod markup;
pub mod process;
pub mod resolve;
pub mod timestamp;

use std::ops::AddAssign;

pub use batch::{run_batch, BatchSummary};
pub use config::Config;
pub use date::CapturedAt;
pub use markup::{extract_facts, DocumentError, Extraction, MediaFact};
pub use process::process_document;

/// Per-document tallies, summed across documents by the batch driver.
///
/// `files_processed + files_not_found` can be lower than `total_entries`:
/// entries without a usable date are counted but never looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessCounters {
    /// Entries in the page that referenced a photo or video.
    pub total_entries: u64,
    /// Facts whose file was found under the media root.
    pub files_processed: u64,
    /// Found files whose timestamps and name were rewritten.
    pub files_updated: u64,
    pub files_not_found: u64,
}

impl ProcessCounters {
    /// Files that were found but could not be dated or renamed.
    pub fn files_not_updated(&self) -> u64 {
        self.files_processed.saturating_sub(self.files_updated)
    }
}

impl AddAssign for ProcessCounters {
    fn add_assign(&mut self, other: Self) {
        self.total_entries += other.total_entries;
        self.files_processed += other.files_processed;
        self.files_updated += other.files_updated;
        self.files_not_found += other.files_not_found;
    }
}
