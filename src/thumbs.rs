//! Thumbnail policy: pure decisions about sizes, names, and regeneration.
//!
//! No pixels move here. The backend does the actual resizing; this module
//! answers the two questions the build pass asks for every item: what size
//! should the thumbnail be, and does the one on disk still qualify.

/// Thumbnails are generated at this multiple of the configured height so
/// they stay sharp on high-DPI screens. The metadata document stores the
/// logical size (divided back down); the file on disk has the physical size.
pub const THUMBNAIL_SIZE_FACTOR: u32 = 2;

/// Whether an item's thumbnail needs to be (re)generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailDecision {
    Keep,
    Regenerate,
}

/// Width-preserving thumbnail size for a source of `size` scaled to
/// `target_height`: `(round(target_height * w / h), target_height)`.
///
/// A nonzero source never maps to a zero-width thumbnail.
pub fn thumbnail_size(size: (u32, u32), target_height: u32) -> (u32, u32) {
    let (width, height) = size;
    if width == 0 || height == 0 || target_height == 0 {
        return (0, target_height);
    }
    let scaled = (target_height as f64 * width as f64 / height as f64).round() as u32;
    (scaled.max(1), target_height)
}

/// Divide a physical thumbnail size back down to the logical size stored
/// in the metadata document, rounding each dimension.
pub fn logical_size(physical: (u32, u32)) -> (u32, u32) {
    let factor = THUMBNAIL_SIZE_FACTOR as f64;
    (
        (physical.0 as f64 / factor).round() as u32,
        (physical.1 as f64 / factor).round() as u32,
    )
}

/// Thumbnail file name for a media file: the name up to the first dot,
/// with a `.jpg` extension. Video thumbnails are extracted frames, so
/// everything becomes a JPEG.
pub fn thumbnail_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}.jpg", stem)
}

/// Decide whether a thumbnail must be regenerated.
///
/// `existing_height` is the physical pixel height of the thumbnail on disk,
/// or `None` when no file exists. Any mismatch against the physical target
/// (including a stale size from an earlier config) forces regeneration.
pub fn decide(
    force: bool,
    existing_height: Option<u32>,
    physical_target_height: u32,
) -> ThumbnailDecision {
    if force {
        return ThumbnailDecision::Regenerate;
    }
    match existing_height {
        Some(height) if height == physical_target_height => ThumbnailDecision::Keep,
        _ => ThumbnailDecision::Regenerate,
    }
}
