//! Gallery configuration module.
//!
//! Every gallery directory carries a `gallery.json` at its root describing
//! where media lives, where thumbnails go, and how the gallery presents
//! itself. The file is created by the `init` command and read by `build`.
//!
//! ```json
//! {
//!   "title": "Summer 2023",
//!   "description": "Two weeks on the coast",
//!   "images_path": "public/images/photos",
//!   "thumbnails_path": "public/images/thumbnails",
//!   "public_path": "public",
//!   "images_data_file": "images_data.json",
//!   "thumbnail_height": 160
//! }
//! ```
//!
//! All path fields are relative to the gallery root. Remote galleries add
//! `remote_gallery_type` and `remote_link`. Unlike most config formats, a
//! missing or unparsable `gallery.json` is a hard error: without it there is
//! no gallery to build.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::GalleryError;

/// Name of the config file within the gallery root.
pub const GALLERY_CONFIG_FILENAME: &str = "gallery.json";

/// Default logical thumbnail height in pixels.
pub const DEFAULT_THUMBNAIL_HEIGHT: u32 = 160;

/// Gallery configuration loaded from `gallery.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Gallery root directory. Set at load time, never serialized.
    #[serde(skip)]
    pub root: PathBuf,
    /// Gallery title shown in the rendered page header.
    pub title: String,
    /// Gallery description shown under the title.
    pub description: String,
    /// Directory holding the full-size media files, relative to the root.
    pub images_path: String,
    /// Directory where thumbnails are written, relative to the root.
    pub thumbnails_path: String,
    /// Directory served as the site root; `src`/`thumbnail` fields in the
    /// metadata document are relative to this.
    pub public_path: String,
    /// Name of the metadata document file within `public_path`.
    pub images_data_file: String,
    /// Logical thumbnail height. Thumbnails are rendered at twice this
    /// height for high-DPI screens.
    pub thumbnail_height: u32,
    /// strftime-style format for displayed capture dates. Empty means no
    /// date formatting.
    pub date_format: String,
    /// When set, a re-probed file keeps its stored description even though
    /// its content changed.
    pub force_description_reuse: bool,
    /// Remote album provider (`"google"` or `"onedrive"`); absent for
    /// local-files galleries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_gallery_type: Option<String>,
    /// Share link of the remote album.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_link: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            title: String::new(),
            description: String::new(),
            images_path: "public/images/photos".to_string(),
            thumbnails_path: "public/images/thumbnails".to_string(),
            public_path: "public".to_string(),
            images_data_file: "images_data.json".to_string(),
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
            date_format: String::new(),
            force_description_reuse: false,
            remote_gallery_type: None,
            remote_link: None,
        }
    }
}

impl GalleryConfig {
    /// Load `gallery.json` from a gallery root.
    ///
    /// A missing or unparsable file yields [`GalleryError::Config`] carrying
    /// the path that was tried.
    pub fn load(root: &Path) -> Result<Self, GalleryError> {
        let path = root.join(GALLERY_CONFIG_FILENAME);
        let content =
            fs::read_to_string(&path).map_err(|_| GalleryError::Config(path.clone()))?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|_| GalleryError::Config(path))?;
        config.root = root.to_path_buf();
        Ok(config)
    }

    /// Write the config back to `gallery.json` in the gallery root.
    pub fn save(&self) -> Result<(), GalleryError> {
        let path = self.root.join(GALLERY_CONFIG_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Absolute directory holding the full-size media files.
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(&self.images_path)
    }

    /// Absolute directory where thumbnails are written.
    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join(&self.thumbnails_path)
    }

    /// Absolute directory served as the site root.
    pub fn public_dir(&self) -> PathBuf {
        self.root.join(&self.public_path)
    }

    /// Absolute path of the metadata document file.
    pub fn images_data_path(&self) -> PathBuf {
        self.public_dir().join(&self.images_data_file)
    }

    /// Physical thumbnail height: logical height scaled for high-DPI
    /// rendering.
    pub fn physical_thumbnail_height(&self) -> u32 {
        self.thumbnail_height * crate::thumbs::THUMBNAIL_SIZE_FACTOR
    }
}

/// Create a new gallery skeleton under `root`.
///
/// Lays out `public/images/photos` and `public/images/thumbnails` and writes
/// a default `gallery.json`. For remote galleries pass the detected provider
/// and the share link; the media directories are still created so the build
/// output has somewhere to land.
pub fn init_gallery(
    root: &Path,
    title: &str,
    description: &str,
    remote: Option<(String, String)>,
) -> Result<GalleryConfig, GalleryError> {
    let mut config = GalleryConfig {
        root: root.to_path_buf(),
        title: title.to_string(),
        description: description.to_string(),
        ..GalleryConfig::default()
    };
    if let Some((remote_type, link)) = remote {
        config.remote_gallery_type = Some(remote_type);
        config.remote_link = Some(link);
    }

    fs::create_dir_all(config.images_dir())?;
    fs::create_dir_all(config.thumbnails_dir())?;
    config.save()?;
    Ok(config)
}
