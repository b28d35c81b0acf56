//! # Gallerist
//!
//! A static photo and video gallery generator. Point it at a folder of
//! media files — or a shared Google Photos / OneDrive album — and it
//! produces a self-contained gallery site: thumbnails, a metadata
//! document, and an `index.html`.
//!
//! # Architecture: Synchronize, Don't Rebuild
//!
//! The core of the tool is a synchronization engine, not a batch
//! converter. Every `build` runs two passes over the gallery:
//!
//! ```text
//! 1. Thumbnails   images/   →  thumbnails/        (only what's missing or stale)
//! 2. Metadata     images/   →  images_data.json   (three-way merge per item)
//! ```
//!
//! The metadata document is user-editable — descriptions typed into
//! `images_data.json` by hand are first-class data. The merge keeps a
//! stored record whenever its change token (content hash, falling back to
//! mtime) still matches the file on disk, so repeated builds are
//! byte-identical no-ops and hand edits survive indefinitely. Only a file
//! that actually changed gets re-probed and overwritten.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `gallery.json` loading and the `init` skeleton |
//! | [`error`] | The crate-wide [`error::GalleryError`] taxonomy |
//! | [`media`] | Probing: kind detection, EXIF, dates, content hash |
//! | [`backend`] | [`backend::MediaBackend`] trait — pixels live behind it |
//! | [`thumbs`] | Thumbnail policy: size math and keep/regenerate decisions |
//! | [`logic`] | The synchronization engine and its three source variants |
//! | [`store`] | The ordered JSON metadata document |
//! | [`render`] | Thin Maud renderer for `index.html` |
//!
//! # Design Decisions
//!
//! ## Content Hashes Over Mtimes
//!
//! Each local record carries a SHA-256 of the file contents as its change
//! token, with the modification time only as a fallback for documents
//! written before hashes existed. Content-based tokens survive `git
//! checkout` and file copies, so a restored gallery doesn't spuriously
//! lose its descriptions.
//!
//! ## Thumbnails at 2× for High-DPI
//!
//! Thumbnail files are generated at twice the configured height and the
//! document stores the logical (display) size. The regeneration check
//! compares the physical height of the file on disk, so changing
//! `thumbnail_height` in the config invalidates exactly the right files.
//!
//! ## Video via ffmpeg Subprocesses
//!
//! Images are processed in pure Rust through the `image` crate. Videos
//! shell out to the system `ffprobe`/`ffmpeg` binaries for dimensions and
//! first-frame thumbnails — decoding MP4 in-process buys nothing here and
//! the tools are ubiquitous. Both paths sit behind the
//! [`backend::MediaBackend`] trait, so the engine never knows the
//! difference.
//!
//! ## Remote Albums Through a Real Browser
//!
//! Shared-album pages render their grids lazily with JavaScript, so the
//! remote listers drive a headless Chrome session rather than scraping
//! HTML. Remote content is immutable per URL, which lets the engine treat
//! every already-known name as up to date and skip its size probe.
//!
//! ## All-or-Nothing Passes
//!
//! Any failing item aborts the whole run before the metadata document is
//! written. A half-synchronized document never reaches disk.

pub mod backend;
pub mod config;
pub mod error;
pub mod logic;
pub mod media;
pub mod render;
pub mod store;
pub mod thumbs;
