//! Media probing: everything the engine learns about a source file.
//!
//! Kind detection, EXIF extraction (orientation, caption, capture date),
//! filesystem timestamps, and the content hash used as the preferred change
//! token. All EXIF handling is lenient: a file without usable EXIF simply
//! yields defaults and the filesystem timestamp takes over.
//!
//! Only the media kind check can fail the pass. An unsupported extension in
//! the images directory means the gallery contains something we would
//! silently misrepresent, so it aborts the whole run.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::GalleryError;
use crate::store::MediaKind;

/// Classify a file by extension (case-insensitive).
///
/// jpg/jpeg/gif/png are images, mp4 is video. Anything else is fatal.
pub fn media_kind(file_name: &str) -> Result<MediaKind, GalleryError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "gif" | "png" => Ok(MediaKind::Image),
        "mp4" => Ok(MediaKind::Video),
        _ => Err(GalleryError::UnsupportedMediaKind(file_name.to_string())),
    }
}

/// True for files that may carry EXIF data.
pub fn is_jpeg(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

/// Rotation a JPEG needs before display, derived from its EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map the EXIF orientation tag to a rotation. Only the three rotated
    /// orientations (3, 6, 8) are handled; mirrored variants pass through.
    pub fn from_orientation(orientation: Option<u16>) -> Self {
        match orientation {
            Some(3) => Rotation::Cw180,
            Some(6) => Rotation::Cw90,
            Some(8) => Rotation::Cw270,
            _ => Rotation::None,
        }
    }
}

/// What EXIF tells us about a JPEG. Everything optional; defaults are used
/// when the file carries no EXIF at all.
#[derive(Debug, Clone, Default)]
pub struct ExifSummary {
    pub orientation: Option<u16>,
    pub description: String,
    pub capture_date: Option<NaiveDateTime>,
}

/// Extract orientation, caption, and capture date from a JPEG. A file
/// without parseable EXIF yields the default summary.
pub fn exif_summary(path: &Path) -> ExifSummary {
    let exif = match rexif::parse_file(path) {
        Ok(data) => data,
        Err(_) => return ExifSummary::default(),
    };

    let mut summary = ExifSummary::default();
    for entry in &exif.entries {
        match entry.tag {
            rexif::ExifTag::Orientation => {
                if let rexif::TagValue::U16(values) = &entry.value {
                    summary.orientation = values.first().copied();
                }
            }
            rexif::ExifTag::ImageDescription => {
                summary.description = decode_description(&entry.value_more_readable);
            }
            _ => {}
        }
    }
    summary.capture_date = extract_capture_date(&exif);
    summary
}

/// Capture date in order of preference: DateTimeOriginal, then
/// DateTimeDigitized, then DateTime.
fn extract_capture_date(exif: &rexif::ExifData) -> Option<NaiveDateTime> {
    let date_fields = [
        rexif::ExifTag::DateTimeOriginal,
        rexif::ExifTag::DateTimeDigitized,
        rexif::ExifTag::DateTime,
    ];

    for field in &date_fields {
        if let Some(entry) = exif.entries.iter().find(|e| e.tag == *field) {
            if let Some(date) = parse_exif_datetime(&entry.value_more_readable) {
                return Some(date);
            }
        }
    }
    None
}

/// EXIF datetime format: "2005:07:30 07:22:46", sometimes with a trailing
/// "+HH:MM" offset that must be dropped before parsing. EXIF ASCII values
/// are NUL-terminated; the terminator may survive extraction.
fn parse_exif_datetime(datetime_str: &str) -> Option<NaiveDateTime> {
    let trimmed = match datetime_str.find('+') {
        Some(pos) => &datetime_str[..pos],
        None => datetime_str,
    };
    let trimmed = trimmed.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(trimmed, "%Y:%m:%d %H:%M:%S").ok()
}

/// Decode an EXIF ImageDescription and escape quotes for safe embedding.
///
/// Some phones write the description as UTF-16 but label it ASCII, which
/// shows up here as one garbled char per byte pair. Re-reading the low byte
/// of each UTF-16 unit recovers the text; when that isn't valid UTF-8 the
/// string was fine as-is.
pub fn decode_description(raw: &str) -> String {
    let low_bytes: Vec<u8> = raw.encode_utf16().map(|unit| (unit & 0xff) as u8).collect();
    let decoded = match String::from_utf8(low_bytes) {
        Ok(text) => text,
        Err(_) => raw.to_string(),
    };
    decoded
        .trim_end_matches('\0')
        .trim()
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

/// Swap width and height for sideways EXIF orientations (6 and 8).
pub fn oriented_size(size: (u32, u32), orientation: Option<u16>) -> (u32, u32) {
    match orientation {
        Some(6) | Some(8) => (size.1, size.0),
        _ => size,
    }
}

/// Modification time as fractional seconds since the epoch, the fallback
/// change token when no content hash is available.
pub fn file_mtime(path: &Path) -> Result<f64, GalleryError> {
    let modified = std::fs::metadata(path)?.modified()?;
    let duration = modified
        .duration_since(UNIX_EPOCH)
        .map_err(|e| GalleryError::GenerationFailure(e.to_string()))?;
    Ok(duration.as_secs_f64())
}

/// File creation time as a local datetime, falling back to the modification
/// time on filesystems that don't record creation.
pub fn file_datetime(path: &Path) -> Option<NaiveDateTime> {
    let metadata = std::fs::metadata(path).ok()?;
    let time = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(time).naive_local())
}

/// SHA-256 of the file contents as a hex string. Content-based rather than
/// mtime-based so it survives `git checkout`.
pub fn hash_file(path: &Path) -> Result<String, GalleryError> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Format a capture date with the configured strftime-style pattern.
///
/// Returns an empty string when there is no date, no pattern, or the
/// pattern contains specifiers chrono doesn't know. The scan over
/// `StrftimeItems` is what keeps a user typo in `date_format` from
/// panicking mid-format.
pub fn format_date(date: Option<NaiveDateTime>, format: &str) -> String {
    let date = match date {
        Some(d) => d,
        None => return String::new(),
    };
    if format.is_empty() {
        return String::new();
    }
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return String::new();
    }
    date.format_with_items(items.into_iter()).to_string()
}

/// Fetch a remote image and report its pixel dimensions.
pub fn remote_image_size(url: &str) -> Result<(u32, u32), GalleryError> {
    let bytes = reqwest::blocking::get(url)?.bytes()?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| GalleryError::Remote(format!("{}: {}", url, e)))?;
    Ok((image.width(), image.height()))
}
