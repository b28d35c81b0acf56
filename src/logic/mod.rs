//! Gallery logic: the synchronization engine.
//!
//! A [`GalleryLogic`] implementation knows where a gallery's media comes
//! from and how to reconcile the metadata document against it. Three
//! variants exist:
//!
//! - [`files::FilesGallery`] — media files in a local directory
//! - [`google::GoogleGallery`] — a shared Google Photos album
//! - [`onedrive::OnedriveGallery`] — a shared OneDrive album
//!
//! The heart of the engine is the three-way merge in [`merge_record`]:
//! for every item the source currently has, the fresh probe result is
//! weighed against the stored record. A stored record whose change token
//! still matches wins outright, which is what keeps hand-edited
//! descriptions alive across rebuilds.

pub mod files;
pub mod google;
pub mod onedrive;

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::backend::MediaBackend;
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::store::{self, Document, MediaRecord};

/// Give up on a remote album listing after this long.
pub const REMOTE_LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Source-specific gallery behavior.
pub trait GalleryLogic {
    /// Ensure every item has a thumbnail of the configured size. Returns
    /// the number of thumbnails generated. Remote galleries return 0, the
    /// provider resizes for them.
    fn create_thumbnails(
        &self,
        backend: &dyn MediaBackend,
        force: bool,
    ) -> Result<usize, GalleryError>;

    /// Merge the source's current state into the metadata document.
    fn reconcile_metadata(
        &self,
        backend: &dyn MediaBackend,
        document: Document,
    ) -> Result<Document, GalleryError>;
}

/// Pick the logic variant for a gallery config.
pub fn for_config(config: &GalleryConfig) -> Box<dyn GalleryLogic> {
    match config.remote_gallery_type.as_deref() {
        Some("google") => Box::new(google::GoogleGallery::new(config.clone())),
        Some("onedrive") => Box::new(onedrive::OnedriveGallery::new(config.clone())),
        _ => Box::new(files::FilesGallery::new(config.clone())),
    }
}

/// Identify the provider behind a share link.
pub fn detect_remote_type(link: &str) -> Option<&'static str> {
    if link.contains("onedrive.live.com") || link.contains("1drv.ms") {
        Some("onedrive")
    } else if link.contains("photos.app.goo.gl") || link.contains("photos.google.com") {
        Some("google")
    } else {
        None
    }
}

/// Where a freshly probed item stands relative to the stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    /// No stored record under this name.
    Absent,
    /// Stored record exists and its change token still matches.
    CachedFresh,
    /// Stored record exists but the source changed underneath it.
    CachedStale,
}

/// Classify a fresh probe result against the stored record.
pub fn classify(stored: Option<&MediaRecord>, fresh: &MediaRecord) -> MergeState {
    match stored {
        None => MergeState::Absent,
        Some(record) if tokens_equal(record, fresh) => MergeState::CachedFresh,
        Some(_) => MergeState::CachedStale,
    }
}

/// Change-token comparison: content hash when both records carry one,
/// modification time otherwise.
fn tokens_equal(stored: &MediaRecord, fresh: &MediaRecord) -> bool {
    match (&stored.imghash, &fresh.imghash) {
        (Some(stored_hash), Some(fresh_hash)) => stored_hash == fresh_hash,
        _ => stored.mtime == fresh.mtime,
    }
}

/// Three-way merge for one item.
///
/// - Absent: the fresh record is inserted as-is.
/// - CachedFresh: the stored record is kept entirely, fields the user may
///   have edited included.
/// - CachedStale: the fresh record replaces the stored one. A stored
///   description survives only with `reuse_descriptions`; otherwise its
///   loss is announced on the console.
pub fn merge_record(
    name: &str,
    stored: Option<&MediaRecord>,
    mut fresh: MediaRecord,
    reuse_descriptions: bool,
) -> MediaRecord {
    match (classify(stored, &fresh), stored) {
        (MergeState::CachedFresh, Some(record)) => record.clone(),
        (MergeState::CachedStale, Some(record)) => {
            if !record.description.is_empty() {
                if reuse_descriptions {
                    fresh.description = record.description.clone();
                } else {
                    println!(
                        "*** Change detected for {}, overwriting existing description.",
                        name
                    );
                }
            }
            fresh
        }
        _ => fresh,
    }
}

/// Run a full metadata pass: load the document, reconcile, and save.
///
/// The document file is only touched after the whole pass succeeded, so a
/// failing item can never leave a half-updated document behind.
pub fn synchronize(
    config: &GalleryConfig,
    logic: &dyn GalleryLogic,
    backend: &dyn MediaBackend,
) -> Result<Document, GalleryError> {
    let path = config.images_data_path();
    let document = store::load_document(&path);
    let document = logic.reconcile_metadata(backend, document)?;
    store::save_document(&path, &document)?;
    Ok(document)
}

/// Open a remote album in a headless Chrome tab.
pub(crate) fn open_album(link: &str) -> Result<(Browser, Arc<Tab>), GalleryError> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .window_size(Some((1920, 1500)))
        .build()
        .map_err(|e| GalleryError::Remote(e.to_string()))?;
    let browser = Browser::new(options).map_err(|e| GalleryError::Remote(e.to_string()))?;

    println!("Loading album from {}...", link);
    let tab = browser
        .new_tab()
        .map_err(|e| GalleryError::Remote(e.to_string()))?;
    tab.navigate_to(link)
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| GalleryError::Remote(e.to_string()))?;
    Ok((browser, tab))
}
