//! Crate-wide error type.
//!
//! Every failure the synchronization engine can hit is fatal for the whole
//! pass: the metadata document is only written after all items succeeded, so
//! a half-updated document can never reach disk. The variants below are the
//! full taxonomy; the CLI boundary turns them into exit codes, the core only
//! returns them.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot load the gallery configuration from {}", .0.display())]
    Config(PathBuf),
    #[error("Unsupported file type ({0})")]
    UnsupportedMediaKind(String),
    #[error("No photos could be found under {}", .0.display())]
    NoItemsFound(PathBuf),
    #[error("Loading the remote album took too long: {0}")]
    RemoteListingTimeout(String),
    #[error("Thumbnail generation failed: {0}")]
    GenerationFailure(String),
    #[error("Remote request failed: {0}")]
    Remote(String),
}

impl From<reqwest::Error> for GalleryError {
    fn from(err: reqwest::Error) -> Self {
        GalleryError::Remote(err.to_string())
    }
}
