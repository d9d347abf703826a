//! Extraction of (filename, capture date) facts from an export HTML page.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::{debug, error, warn};
use scraper::{ElementRef, Html, Selector};

use crate::date::{self, CapturedAt};

/// Class names and labels that identify a media entry in the export layout.
///
/// The export HTML is generated with obfuscated presentation classes that
/// change between export versions; everything layout-specific lives here.
pub struct ExportSignature {
    /// One media item's metadata block.
    pub entry: &'static str,
    /// Media reference inside an entry, in preference order.
    pub media: &'static [&'static str],
    /// Label and value cells share the same class.
    pub date_field: &'static str,
    /// Label texts preceding the date value cell, in preference order.
    pub date_labels: &'static [&'static str],
    /// Block holding a bare timestamp when no labelled date exists.
    pub fallback_date: &'static str,
}

pub const EXPORT_SIGNATURE: ExportSignature = ExportSignature {
    entry: ".pam._3-95._2ph-._a6-g.uiBoxWhite.noborder",
    media: &["img", "video"],
    date_field: "div._a6-q",
    date_labels: &["Date taken", "Creation time"],
    fallback_date: "div._3-94._a6-o",
};

struct Selectors {
    entry: Selector,
    media: Vec<Selector>,
    date_field: Selector,
    fallback_date: Selector,
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(|| Selectors {
    entry: Selector::parse(EXPORT_SIGNATURE.entry).unwrap(),
    media: EXPORT_SIGNATURE
        .media
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect(),
    date_field: Selector::parse(EXPORT_SIGNATURE.date_field).unwrap(),
    fallback_date: Selector::parse(EXPORT_SIGNATURE.fallback_date).unwrap(),
});

/// A media filename paired with the capture time the export recorded for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFact {
    pub filename: String,
    pub captured_at: CapturedAt,
}

/// Facts found in one document.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub facts: Vec<MediaFact>,
    /// Entries that carried a media reference, whether or not a fact came of them.
    pub total_entries: u64,
}

/// Whole-document failure.
#[derive(Debug)]
pub enum DocumentError {
    NotFound(PathBuf),
    Unreadable(PathBuf, io::Error),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::NotFound(path) => write!(f, "HTML file not found at {}", path.display()),
            DocumentError::Unreadable(path, e) => {
                write!(f, "Cannot read HTML file {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::NotFound(_) => None,
            DocumentError::Unreadable(_, e) => Some(e),
        }
    }
}

/// Read and parse one export page.
pub fn extract_facts(path: &Path) -> Result<Extraction, DocumentError> {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DocumentError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(DocumentError::Unreadable(path.to_path_buf(), e)),
    };
    Ok(extract_from_html(&html))
}

/// Parse export HTML already in memory.
pub fn extract_from_html(html: &str) -> Extraction {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();

    for entry in document.select(&SELECTORS.entry) {
        let Some(media) = find_media(entry) else {
            warn!("Missing img or video element in an entry");
            continue;
        };
        extraction.total_entries += 1;

        let Some(filename) = media.value().attr("src").and_then(media_file_name) else {
            warn!("Media element without a usable src attribute");
            continue;
        };

        let Some(date_str) = find_date_string(entry) else {
            warn!("No date found for file: {}", filename);
            continue;
        };

        match date::parse_export_date(&date_str) {
            Some(captured_at) => {
                debug!("Found {} taken {}", filename, captured_at);
                extraction.facts.push(MediaFact {
                    filename,
                    captured_at,
                });
            }
            None => error!("Error parsing date: {} for file: {}", date_str, filename),
        }
    }

    extraction
}

fn find_media(entry: ElementRef<'_>) -> Option<ElementRef<'_>> {
    SELECTORS
        .media
        .iter()
        .find_map(|selector| entry.select(selector).next())
}

/// Base name of a media `src`, without any query string.
fn media_file_name(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

fn find_date_string(entry: ElementRef<'_>) -> Option<String> {
    let fields: Vec<ElementRef<'_>> = entry.select(&SELECTORS.date_field).collect();

    for label in EXPORT_SIGNATURE.date_labels {
        if let Some(pos) = fields.iter().position(|f| element_text(*f) == *label) {
            if let Some(value) = fields.get(pos + 1) {
                return Some(element_text(*value));
            }
        }
    }

    entry
        .select(&SELECTORS.fallback_date)
        .next()
        .map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
