use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What a file's container says about embedded EXIF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedDate {
    /// The container has no EXIF block at all.
    Absent,
    /// An EXIF block parsed; carries its capture date if one was readable.
    Present(Option<NaiveDateTime>),
}

/// Read the embedded capture date of an image file.
///
/// A missing EXIF block is `Ok(Absent)`; a block that exists but cannot be
/// parsed is an error.
pub fn read_embedded_date(path: &Path) -> Result<EmbeddedDate, exif::Error> {
    let file = File::open(path)?;
    let reader = match Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(reader) => reader,
        Err(exif::Error::NotFound(_)) => return Ok(EmbeddedDate::Absent),
        Err(e) => return Err(e),
    };

    let tags = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

    for tag in &tags {
        if let Some(field) = reader.get_field(*tag, In::PRIMARY) {
            let val = field.display_value().to_string();
            if let Some(dt) = parse_exif_datetime(&val) {
                return Ok(EmbeddedDate::Present(Some(dt)));
            }
        }
    }

    Ok(EmbeddedDate::Present(None))
}

fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s.replace(['-', '/', '\\', '.'], ":");

    if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(d) = chrono::NaiveDate::parse_from_str(cleaned.split(' ').next()?, "%Y:%m:%d") {
        return d.and_hms_opt(0, 0, 0);
    }

    None
}
