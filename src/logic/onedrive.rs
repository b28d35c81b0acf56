//! OneDrive shared-album gallery.
//!
//! OneDrive loads its grid in bursts after the initial page load, so the
//! listing polls the tile count until it stops moving. Like Google Photos,
//! the provider resizes on demand (`?psid=1&width=&height=`), so no local
//! thumbnails are generated and known names are kept untouched.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::backend::MediaBackend;
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::media;
use crate::store::{Document, MediaKind, MediaRecord};
use crate::thumbs;

use super::{GalleryLogic, REMOTE_LISTING_TIMEOUT};

/// The album's photo tiles.
const TILE_SELECTOR: &str = ".od-ImageTile-image";

/// Time between tile-count polls while the page loads.
const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub struct OnedriveGallery {
    config: GalleryConfig,
}

impl OnedriveGallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self { config }
    }

    /// Wait for the grid to stabilize, then collect every photo's base
    /// URL keyed by photo name.
    fn list_album_photos(&self, link: &str) -> Result<BTreeMap<String, String>, GalleryError> {
        let (_browser, tab) = super::open_album(link)?;

        // The page keeps adding tiles for a while; it counts as loaded
        // once two consecutive polls agree on more than one tile.
        let start = Instant::now();
        let mut last_count = 0;
        loop {
            let count = tab
                .find_elements(TILE_SELECTOR)
                .map(|tiles| tiles.len())
                .unwrap_or(0);
            if count > 1 && count == last_count {
                break;
            }
            last_count = count;
            if start.elapsed() > REMOTE_LISTING_TIMEOUT {
                return Err(GalleryError::RemoteListingTimeout(link.to_string()));
            }
            thread::sleep(POLL_INTERVAL);
        }

        let mut photos = BTreeMap::new();
        for element in tab.find_elements(TILE_SELECTOR).unwrap_or_default() {
            let url = element
                .get_attribute_value("src")
                .map_err(|e| GalleryError::Remote(e.to_string()))?;
            if let Some(url) = url {
                let (base_url, name) = parse_photo_link(&url);
                photos.insert(name, base_url);
            }
        }

        println!("Photos found: {}", photos.len());
        Ok(photos)
    }
}

/// Split a photo URL into its base (everything before the query) and the
/// photo name (the last path segment of the base).
pub fn parse_photo_link(photo_url: &str) -> (String, String) {
    let base_url = photo_url.split('?').next().unwrap_or(photo_url).to_string();
    let name = base_url.rsplit('/').next().unwrap_or(&base_url).to_string();
    (base_url, name)
}

/// URL serving the photo at its full size.
pub fn max_size_url(base_url: &str) -> String {
    format!("{}?psid=1&width=9999&height=9999", base_url)
}

/// Record for a newly discovered photo, with provider-sized links.
pub fn build_record(
    base_url: &str,
    size: (u32, u32),
    thumbnail_height: u32,
    now: f64,
) -> MediaRecord {
    let thumbnail_size = thumbs::thumbnail_size(size, thumbnail_height);
    MediaRecord {
        src: format!("{}?psid=1&width={}&height={}", base_url, size.0, size.1),
        mtime: now,
        imghash: None,
        date: String::new(),
        size,
        kind: MediaKind::Image,
        description: String::new(),
        thumbnail: format!(
            "{}?psid=1&width={}&height={}",
            base_url, thumbnail_size.0, thumbnail_size.1
        ),
        thumbnail_size,
    }
}

impl GalleryLogic for OnedriveGallery {
    /// Nothing to do: thumbnails are provider links.
    fn create_thumbnails(
        &self,
        _backend: &dyn MediaBackend,
        _force: bool,
    ) -> Result<usize, GalleryError> {
        Ok(0)
    }

    fn reconcile_metadata(
        &self,
        _backend: &dyn MediaBackend,
        mut document: Document,
    ) -> Result<Document, GalleryError> {
        let link = self
            .config
            .remote_link
            .as_deref()
            .ok_or_else(|| GalleryError::Remote("no remote link configured".to_string()))?;

        let photos = self.list_album_photos(link)?;
        if photos.is_empty() {
            return Err(GalleryError::NoItemsFound(PathBuf::from(link)));
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GalleryError::Remote(e.to_string()))?
            .as_secs_f64();

        let total = photos.len();
        for (current, (name, base_url)) in photos.into_iter().enumerate() {
            if document.contains_key(&name) {
                continue;
            }
            println!("{}/{}\t\tProcessing photo {}", current + 1, total, name);
            let size = media::remote_image_size(&max_size_url(&base_url))?;
            document.insert(
                name,
                build_record(&base_url, size, self.config.thumbnail_height, now),
            );
        }
        Ok(document)
    }
}
