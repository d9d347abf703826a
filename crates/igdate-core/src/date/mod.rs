pub mod exif;

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Capture time of a media item as written in the export.
///
/// Most export pages print a bare wall-clock time; a few variants carry an
/// explicit UTC offset. The wall clock is what ends up in filenames and EXIF,
/// the absolute instant is what ends up in filesystem timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturedAt {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl CapturedAt {
    /// Wall-clock time as printed in the export.
    pub fn wall_clock(&self) -> NaiveDateTime {
        match self {
            CapturedAt::Naive(dt) => *dt,
            CapturedAt::Zoned(dt) => dt.naive_local(),
        }
    }

    /// Unix timestamp in seconds. Naive values are taken as local time.
    /// Returns None for a wall-clock time skipped by a DST transition.
    pub fn unix_timestamp(&self) -> Option<i64> {
        match self {
            CapturedAt::Naive(dt) => dt
                .and_local_timezone(Local)
                .earliest()
                .map(|local| local.timestamp()),
            CapturedAt::Zoned(dt) => Some(dt.timestamp()),
        }
    }

    /// `YYYYMMDD_HHMMSS`, the stem of the canonical filename.
    pub fn canonical_stem(&self) -> String {
        self.wall_clock().format("%Y%m%d_%H%M%S").to_string()
    }

    /// `YYYY:MM:DD HH:MM:SS`, the EXIF datetime representation.
    pub fn exif_datetime(&self) -> String {
        self.wall_clock().format("%Y:%m:%d %H:%M:%S").to_string()
    }
}

impl fmt::Display for CapturedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturedAt::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CapturedAt::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

static WEEKDAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap()
});
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+at\s+").unwrap());
static MERIDIEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)\s*([ap])\.?m\.?").unwrap());
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static SEPT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bsept\b\.?").unwrap());

const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %H:%M:%S",
    "%B %d %Y %H:%M",
    "%d %B %Y %I:%M:%S %p",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y:%m:%d %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%B %d %Y", "%d %B %Y", "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y:%m:%d"];

/// Parse a human-readable date as printed in the export pages.
///
/// Tolerates month names in short or long form, commas, ordinal suffixes,
/// a leading weekday, "at" between date and time, lowercase or dotted
/// meridiem markers and any run of Unicode whitespace. Date-only strings
/// resolve to midnight.
pub fn parse_export_date(raw: &str) -> Option<CapturedAt> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(CapturedAt::Zoned(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(CapturedAt::Zoned(dt));
    }
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
            return Some(CapturedAt::Zoned(dt));
        }
    }

    let normalized = normalize(trimmed);

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(CapturedAt::Naive(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&normalized, fmt) {
            return Some(CapturedAt::Naive(d.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

fn normalize(s: &str) -> String {
    let s = s.replace(',', " ");
    let s = SPACE_RE.replace_all(&s, " ");
    let s = WEEKDAY_RE.replace(s.trim(), "");
    let s = AT_RE.replace_all(&s, " ");
    let s = ORDINAL_RE.replace_all(&s, "$1");
    let s = SEPT_RE.replace_all(&s, "Sep");
    let s = MERIDIEM_RE.replace_all(&s, "$1 ${2}M");
    SPACE_RE.replace_all(s.trim(), " ").into_owned()
}
