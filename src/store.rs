//! Metadata document storage.
//!
//! The gallery's knowledge about its media lives in a single JSON document
//! (`images_data.json` inside the public directory) mapping file names to
//! [`MediaRecord`]s. The document is the thing users edit by hand — mostly
//! the `description` fields — so the synchronization engine treats it as
//! authoritative for anything it cannot prove stale.
//!
//! Records are kept in a `BTreeMap` and written pretty-printed, so a run
//! that changes nothing writes byte-identical output and a `git diff` of
//! the document only ever shows real changes.
//!
//! A missing or corrupt document is not an error: it loads as empty and the
//! next successful pass rewrites it from scratch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::GalleryError;

/// The metadata document: file name → record, ordered by name.
pub type Document = BTreeMap<String, MediaRecord>;

/// Supported media categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Everything the gallery knows about one media item.
///
/// `src` and `thumbnail` are relative to the configured public directory
/// for local galleries, and absolute provider URLs for remote galleries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Location of the full-size media.
    pub src: String,
    /// Modification time of the source file, seconds since the epoch.
    pub mtime: f64,
    /// SHA-256 of the source file contents. Preferred change token when
    /// both the stored and the fresh record carry one; absent for remote
    /// items and for documents written by older versions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imghash: Option<String>,
    /// Formatted capture date. Empty when no date could be determined or
    /// no date format is configured.
    pub date: String,
    /// Full-size dimensions in pixels, orientation-corrected.
    pub size: (u32, u32),
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Caption shown under the item. User-editable; preserved across runs
    /// while the source file is unchanged.
    pub description: String,
    /// Location of the thumbnail.
    pub thumbnail: String,
    /// Logical thumbnail dimensions (the physical file is twice this size).
    pub thumbnail_size: (u32, u32),
}

/// Load the metadata document. Returns an empty document if the file
/// doesn't exist or can't be parsed.
pub fn load_document(path: &Path) -> Document {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Document::new(),
    };
    serde_json::from_str(&content).unwrap_or_default()
}

/// Write the metadata document, pretty-printed with keys in name order.
///
/// Callers must only save after a fully successful pass; a failed item
/// aborts the whole run before this is reached.
pub fn save_document(path: &Path, document: &Document) -> Result<(), GalleryError> {
    let json = serde_json::to_string_pretty(document)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_record(name: &str) -> MediaRecord {
        MediaRecord {
            src: format!("images/photos/{}", name),
            mtime: 1700000000.0,
            imghash: Some("abc123".to_string()),
            date: "1 January 2023".to_string(),
            size: (1000, 500),
            kind: MediaKind::Image,
            description: String::new(),
            thumbnail: format!("images/thumbnails/{}", name),
            thumbnail_size: (320, 160),
        }
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let doc = load_document(&tmp.path().join("images_data.json"));
        assert!(doc.is_empty());
    }

    #[test]
    fn load_corrupt_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images_data.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_document(&path).is_empty());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images_data.json");

        let mut doc = Document::new();
        doc.insert("a.jpg".to_string(), sample_record("a.jpg"));
        save_document(&path, &doc).unwrap();

        let loaded = load_document(&path);
        assert_eq!(loaded, doc);
    }

    #[test]
    fn save_is_byte_identical_across_reruns() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images_data.json");

        let mut doc = Document::new();
        doc.insert("b.jpg".to_string(), sample_record("b.jpg"));
        doc.insert("a.jpg".to_string(), sample_record("a.jpg"));

        save_document(&path, &doc).unwrap();
        let first = fs::read(&path).unwrap();
        save_document(&path, &doc).unwrap();
        let second = fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn keys_are_name_ordered_on_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("images_data.json");

        let mut doc = Document::new();
        doc.insert("zebra.jpg".to_string(), sample_record("zebra.jpg"));
        doc.insert("apple.jpg".to_string(), sample_record("apple.jpg"));
        save_document(&path, &doc).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let apple = content.find("apple.jpg").unwrap();
        let zebra = content.find("zebra.jpg").unwrap();
        assert!(apple < zebra);
    }

    #[test]
    fn kind_serializes_lowercase_as_type() {
        let record = sample_record("a.jpg");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""type":"image""#));
    }

    #[test]
    fn missing_imghash_is_omitted() {
        let mut record = sample_record("v.mp4");
        record.kind = MediaKind::Video;
        record.imghash = None;
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("imghash"));

        let back: MediaRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.imghash, None);
        assert_eq!(back.kind, MediaKind::Video);
    }
}
