//! Media backend trait and the production implementation.
//!
//! The [`MediaBackend`] trait defines the two operations the build pass
//! needs from the pixel world: identify (dimensions) and thumbnail. The
//! rest of the engine is backend-agnostic, which is also what makes the
//! merge and policy logic testable without touching ffmpeg.
//!
//! [`StandardBackend`] handles images in pure Rust through the `image`
//! crate. Videos shell out to the system `ffprobe`/`ffmpeg` binaries:
//! dimensions come from `ffprobe`, the thumbnail is the first frame
//! scaled down by `ffmpeg`.

use image::imageops::FilterType;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::GalleryError;
use crate::media::Rotation;
use crate::store::MediaKind;

/// One thumbnail request. `size` is the physical output size in pixels;
/// `rotation` is the EXIF correction to apply before scaling.
#[derive(Debug, Clone)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: MediaKind,
    pub size: (u32, u32),
    pub rotation: Rotation,
}

/// Trait for media processing backends.
pub trait MediaBackend: Sync {
    /// Raw pixel dimensions of the source, before any orientation handling.
    fn identify(&self, path: &Path, kind: MediaKind) -> Result<(u32, u32), GalleryError>;

    /// Write a thumbnail JPEG at the requested physical size.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), GalleryError>;
}

/// Production backend: `image` crate for images, ffmpeg tools for video.
#[derive(Default)]
pub struct StandardBackend;

impl StandardBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for StandardBackend {
    fn identify(&self, path: &Path, kind: MediaKind) -> Result<(u32, u32), GalleryError> {
        match kind {
            MediaKind::Image => image::image_dimensions(path)
                .map_err(|e| GalleryError::GenerationFailure(format!("{}: {}", path.display(), e))),
            MediaKind::Video => probe_video_dimensions(path),
        }
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), GalleryError> {
        match params.kind {
            MediaKind::Image => image_thumbnail(params),
            MediaKind::Video => video_thumbnail(params),
        }
    }
}

fn image_thumbnail(params: &ThumbnailParams) -> Result<(), GalleryError> {
    let source = image::open(&params.source)
        .map_err(|e| GalleryError::GenerationFailure(format!("{}: {}", params.source.display(), e)))?;

    let rotated = match params.rotation {
        Rotation::None => source,
        Rotation::Cw90 => source.rotate90(),
        Rotation::Cw180 => source.rotate180(),
        Rotation::Cw270 => source.rotate270(),
    };

    let (width, height) = params.size;
    let thumb = rotated.resize_exact(width, height, FilterType::Lanczos3);
    thumb
        .to_rgb8()
        .save(&params.output)
        .map_err(|e| GalleryError::GenerationFailure(format!("{}: {}", params.output.display(), e)))?;
    Ok(())
}

/// Minimal slice of `ffprobe -show_entries stream=width,height -of json`.
#[derive(Deserialize)]
struct FfprobeOutput {
    streams: Vec<FfprobeStream>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    width: u32,
    height: u32,
}

fn probe_video_dimensions(path: &Path) -> Result<(u32, u32), GalleryError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "json",
        ])
        .arg(path)
        .output()
        .map_err(|e| GalleryError::GenerationFailure(format!("ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(GalleryError::GenerationFailure(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let parsed: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    let stream = parsed.streams.first().ok_or_else(|| {
        GalleryError::GenerationFailure(format!("{}: no video stream", path.display()))
    })?;
    Ok((stream.width, stream.height))
}

/// First frame of the video, scaled to the physical thumbnail size.
fn video_thumbnail(params: &ThumbnailParams) -> Result<(), GalleryError> {
    let (width, height) = params.size;
    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-i"])
        .arg(&params.source)
        .args(["-vf", &format!("scale={}:{}", width, height), "-frames:v", "1"])
        .arg(&params.output)
        .output()
        .map_err(|e| GalleryError::GenerationFailure(format!("ffmpeg: {}", e)))?;

    if !output.status.success() {
        return Err(GalleryError::GenerationFailure(format!(
            "ffmpeg failed for {}: {}",
            params.source.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mock backend that records operations. `thumbnail` writes a real JPEG
    /// of the requested size so the regeneration policy sees it on disk.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<(u32, u32)>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Thumbnail {
            source: String,
            output: String,
            size: (u32, u32),
            rotation: Rotation,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Results are popped, so push them in reverse call order.
        pub fn with_dimensions(dims: Vec<(u32, u32)>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn thumbnail_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Thumbnail { .. }))
                .count()
        }
    }

    impl MediaBackend for MockBackend {
        fn identify(&self, path: &Path, _kind: MediaKind) -> Result<(u32, u32), GalleryError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| GalleryError::GenerationFailure("no mock dimensions".to_string()))
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), GalleryError> {
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                size: params.size,
                rotation: params.rotation,
            });
            let (width, height) = params.size;
            let img = image::RgbImage::new(width.max(1), height.max(1));
            img.save(&params.output)
                .map_err(|e| GalleryError::GenerationFailure(e.to_string()))?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![(800, 600)]);
        let dims = backend
            .identify(Path::new("/g/photo.jpg"), MediaKind::Image)
            .unwrap();
        assert_eq!(dims, (800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/g/photo.jpg"));
    }

    #[test]
    fn mock_thumbnail_writes_file_of_requested_size() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let output = tmp.path().join("thumb.jpg");

        backend
            .thumbnail(&ThumbnailParams {
                source: tmp.path().join("photo.jpg"),
                output: output.clone(),
                kind: MediaKind::Image,
                size: (640, 320),
                rotation: Rotation::None,
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (640, 320));
        assert_eq!(backend.thumbnail_count(), 1);
    }

    #[test]
    fn standard_backend_identifies_image() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        image::RgbImage::new(1000, 500).save(&path).unwrap();

        let backend = StandardBackend::new();
        assert_eq!(
            backend.identify(&path, MediaKind::Image).unwrap(),
            (1000, 500)
        );
    }

    #[test]
    fn standard_backend_resizes_image() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        let output = tmp.path().join("thumb.jpg");
        image::RgbImage::new(1000, 500).save(&source).unwrap();

        let backend = StandardBackend::new();
        backend
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                kind: MediaKind::Image,
                size: (640, 320),
                rotation: Rotation::None,
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (640, 320));
    }

    #[test]
    fn standard_backend_rotation_swaps_output() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("photo.jpg");
        let output = tmp.path().join("thumb.jpg");
        image::RgbImage::new(1000, 500).save(&source).unwrap();

        let backend = StandardBackend::new();
        backend
            .thumbnail(&ThumbnailParams {
                source,
                output: output.clone(),
                kind: MediaKind::Image,
                size: (160, 320),
                rotation: Rotation::Cw90,
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (160, 320));
    }

    #[test]
    fn standard_backend_missing_image_is_failure() {
        let backend = StandardBackend::new();
        let result = backend.identify(Path::new("/nonexistent/x.jpg"), MediaKind::Image);
        assert!(matches!(result, Err(GalleryError::GenerationFailure(_))));
    }
}
