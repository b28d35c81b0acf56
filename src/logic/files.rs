//! Local-files gallery: media lives in a directory on disk.
//!
//! Listing is a flat, name-sorted scan of the images directory. Every item
//! is probed for dimensions, EXIF caption, capture date, and a content
//! hash; the merge in [`super::merge_record`] then decides what survives
//! from the stored document.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::backend::{MediaBackend, ThumbnailParams};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::media::{self, ExifSummary, Rotation};
use crate::store::{Document, MediaKind, MediaRecord};
use crate::thumbs::{self, ThumbnailDecision};

use super::{merge_record, GalleryLogic};

pub struct FilesGallery {
    config: GalleryConfig,
}

impl FilesGallery {
    pub fn new(config: GalleryConfig) -> Self {
        Self { config }
    }

    /// All media files in the images directory, sorted by name. Hidden
    /// files are ignored; an empty directory fails the pass.
    fn list_media(&self) -> Result<Vec<PathBuf>, GalleryError> {
        let dir = self.config.images_dir();
        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .map(|entry| entry.into_path())
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(GalleryError::NoItemsFound(dir));
        }
        Ok(files)
    }

    /// Path of an item's thumbnail inside the thumbnails directory.
    fn thumbnail_path(&self, file_name: &str) -> PathBuf {
        self.config
            .thumbnails_dir()
            .join(thumbs::thumbnail_name(file_name))
    }

    /// Location string relative to the public directory, as embedded in
    /// the rendered HTML. Falls back to the full path for media stored
    /// outside the public directory.
    fn public_relative(&self, path: &Path) -> String {
        match path.strip_prefix(self.config.public_dir()) {
            Ok(relative) => relative.to_string_lossy().into_owned(),
            Err(_) => path.to_string_lossy().into_owned(),
        }
    }

    /// Build the fresh record for one file. The thumbnail is assumed to
    /// exist already; the thumbnail pass runs before reconciliation.
    fn probe(&self, backend: &dyn MediaBackend, path: &Path) -> Result<MediaRecord, GalleryError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = media::media_kind(&file_name)?;

        let summary = if media::is_jpeg(&file_name) {
            media::exif_summary(path)
        } else {
            ExifSummary::default()
        };

        let raw_size = backend.identify(path, kind)?;
        let size = match kind {
            MediaKind::Image => media::oriented_size(raw_size, summary.orientation),
            MediaKind::Video => raw_size,
        };

        let capture = summary.capture_date.or_else(|| media::file_datetime(path));
        let date = media::format_date(capture, &self.config.date_format);

        let mut description = summary.description;
        // An empty caption hides the date in the rendered overlay, so a
        // dated item gets a single space as its caption.
        if !date.is_empty() && description.is_empty() {
            description = " ".to_string();
        }

        // The thumbnail's stored size reflects the file actually on disk.
        // Regeneration only triggers on height, so an aspect change with a
        // matching height keeps the existing file, and the document must
        // agree with it.
        let thumbnail_path = self.thumbnail_path(&file_name);
        let physical = match image::image_dimensions(&thumbnail_path) {
            Ok(dims) => dims,
            Err(_) => thumbs::thumbnail_size(size, self.config.physical_thumbnail_height()),
        };

        Ok(MediaRecord {
            src: self.public_relative(path),
            mtime: media::file_mtime(path)?,
            imghash: Some(media::hash_file(path)?),
            date,
            size,
            kind,
            description,
            thumbnail: self.public_relative(&thumbnail_path),
            thumbnail_size: thumbs::logical_size(physical),
        })
    }
}

impl GalleryLogic for FilesGallery {
    fn create_thumbnails(
        &self,
        backend: &dyn MediaBackend,
        force: bool,
    ) -> Result<usize, GalleryError> {
        let physical_height = self.config.physical_thumbnail_height();
        fs::create_dir_all(self.config.thumbnails_dir())?;

        let mut created = 0;
        for path in self.list_media()? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let kind = media::media_kind(&file_name)?;
            let thumbnail_path = self.thumbnail_path(&file_name);

            let existing_height = image::image_dimensions(&thumbnail_path)
                .ok()
                .map(|(_, h)| h);
            if thumbs::decide(force, existing_height, physical_height) == ThumbnailDecision::Keep
            {
                continue;
            }

            let summary = if media::is_jpeg(&file_name) {
                media::exif_summary(&path)
            } else {
                ExifSummary::default()
            };
            let raw_size = backend.identify(&path, kind)?;
            let size = match kind {
                MediaKind::Image => media::oriented_size(raw_size, summary.orientation),
                MediaKind::Video => raw_size,
            };

            backend.thumbnail(&ThumbnailParams {
                source: path,
                output: thumbnail_path,
                kind,
                size: thumbs::thumbnail_size(size, physical_height),
                rotation: Rotation::from_orientation(summary.orientation),
            })?;
            created += 1;
        }

        println!("New thumbnails generated: {}", created);
        Ok(created)
    }

    fn reconcile_metadata(
        &self,
        backend: &dyn MediaBackend,
        mut document: Document,
    ) -> Result<Document, GalleryError> {
        for path in self.list_media()? {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let fresh = self.probe(backend, &path)?;
            let merged = merge_record(
                &file_name,
                document.get(&file_name),
                fresh,
                self.config.force_description_reuse,
            );
            document.insert(file_name, merged);
        }
        Ok(document)
    }
}
