//! Google Photos shared-album gallery.
//!
//! The album page renders its grid lazily while scrolling, so listing it
//! means driving the page: scroll, collect the `data-latest-bg` tiles that
//! appeared, repeat until the bottom is reached. Google serves any size on
//! demand through the `=w{w}-h{h}-no` URL suffix, so there is nothing to
//! generate locally; thumbnails are just differently-sized links.
//!
//! Items already present in the metadata document are left untouched: a
//! provider URL never changes content, so a known name is by definition
//! up to date. This also spares one HTTP size probe per known photo.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use headless_chrome::Tab;

use crate::backend::MediaBackend;
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::media;
use crate::store::{Document, MediaKind, MediaRecord};
use crate::thumbs;

use super::{GalleryLogic, REMOTE_LISTING_TIMEOUT};

/// The scrollable grid container on the album page.
const SCROLL_CONTAINER: &str = "c-wiz[id]";

/// Tiles carry their photo URL in this attribute.
const TILE_SELECTOR: &str = "div[data-latest-bg]";

pub struct GoogleGallery {
    config: GalleryConfig,
}

impl GoogleGallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self { config }
    }

    /// Scroll through the album and collect every photo's base URL,
    /// keyed by photo name.
    fn list_album_photos(&self, link: &str) -> Result<BTreeMap<String, String>, GalleryError> {
        let (_browser, tab) = super::open_album(link)?;
        tab.wait_for_element(TILE_SELECTOR)
            .map_err(|e| GalleryError::Remote(e.to_string()))?;

        let start = Instant::now();
        let mut photos = BTreeMap::new();
        loop {
            for element in tab.find_elements(TILE_SELECTOR).unwrap_or_default() {
                let url = element
                    .get_attribute_value("data-latest-bg")
                    .map_err(|e| GalleryError::Remote(e.to_string()))?;
                if let Some(url) = url {
                    if !url.starts_with("http") {
                        continue;
                    }
                    let (base_url, name) = parse_photo_link(&url);
                    photos.insert(name, base_url);
                }
            }

            if is_scroll_bottom(&tab)? {
                break;
            }
            if start.elapsed() > REMOTE_LISTING_TIMEOUT {
                return Err(GalleryError::RemoteListingTimeout(link.to_string()));
            }
            scroll_down(&tab)?;
            thread::sleep(Duration::from_secs(1));
        }

        println!("Photos found: {}", photos.len());
        Ok(photos)
    }
}

fn is_scroll_bottom(tab: &Tab) -> Result<bool, GalleryError> {
    let expression = format!(
        "document.querySelector('{0}').scrollHeight \
         - document.querySelector('{0}').scrollTop \
         - document.querySelector('{0}').getBoundingClientRect().height === 0",
        SCROLL_CONTAINER
    );
    let result = tab
        .evaluate(&expression, false)
        .map_err(|e| GalleryError::Remote(e.to_string()))?;
    Ok(result.value.and_then(|v| v.as_bool()).unwrap_or(false))
}

fn scroll_down(tab: &Tab) -> Result<(), GalleryError> {
    let expression = format!(
        "document.querySelector('{0}').scrollBy(0, \
         document.querySelector('{0}').getBoundingClientRect().height)",
        SCROLL_CONTAINER
    );
    tab.evaluate(&expression, false)
        .map_err(|e| GalleryError::Remote(e.to_string()))?;
    Ok(())
}

/// Split a photo URL into its base (everything before the size suffix)
/// and the photo name (the last path segment of the base).
pub fn parse_photo_link(photo_url: &str) -> (String, String) {
    let base_url = photo_url.split('=').next().unwrap_or(photo_url).to_string();
    let name = base_url.rsplit('/').next().unwrap_or(&base_url).to_string();
    (base_url, name)
}

/// URL serving the photo at its full size.
pub fn max_size_url(base_url: &str) -> String {
    format!("{}=w9999-h9999-no", base_url)
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
        src: format!("{}=w{}-h{}-no", base_url, size.0, size.1),
        mtime: now,
        imghash: None,
        date: String::new(),
        size,
        kind: MediaKind::Image,
        description: String::new(),
        thumbnail: format!(
            "{}=w{}-h{}-no",
            base_url, thumbnail_size.0, thumbnail_size.1
        ),
        thumbnail_size,
    }
}

impl GalleryLogic for GoogleGallery {
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
