//! End-to-end build pipeline tests: init a gallery on disk, run the
//! thumbnail and metadata passes with the real backend, and check what
//! lands in the public directory.

use std::fs;

use gallerist::backend::StandardBackend;
use gallerist::config::{self, GalleryConfig};
use gallerist::error::GalleryError;
use gallerist::logic;
use gallerist::render;
use gallerist::store;
use tempfile::TempDir;

fn init_with_photo(width: u32, height: u32) -> (TempDir, GalleryConfig) {
    let tmp = TempDir::new().unwrap();
    let config = config::init_gallery(tmp.path(), "Holiday", "Coast trip", None).unwrap();
    image::RgbImage::new(width, height)
        .save(config.images_dir().join("photo.jpg"))
        .unwrap();
    (tmp, config)
}

fn run_build(config: &GalleryConfig) -> store::Document {
    let gallery = logic::for_config(config);
    let backend = StandardBackend::new();
    gallery.create_thumbnails(&backend, false).unwrap();
    let document = logic::synchronize(config, gallery.as_ref(), &backend).unwrap();
    render::write_index(config, &document).unwrap();
    document
}

#[test]
fn full_build_produces_expected_artifacts() {
    let (_tmp, config) = init_with_photo(1000, 500);
    let document = run_build(&config);

    // Thumbnail at the physical (2x) size.
    let thumb = config.thumbnails_dir().join("photo.jpg");
    assert_eq!(image::image_dimensions(&thumb).unwrap(), (640, 320));

    // Document with the logical size.
    let record = &document["photo.jpg"];
    assert_eq!(record.size, (1000, 500));
    assert_eq!(record.thumbnail_size, (320, 160));
    assert_eq!(record.src, "images/photos/photo.jpg");
    assert!(config.images_data_path().is_file());

    // Rendered page links thumbnail to source.
    let html = fs::read_to_string(config.public_dir().join("index.html")).unwrap();
    assert!(html.contains("Holiday"));
    assert!(html.contains(r#"href="images/photos/photo.jpg""#));
    assert!(html.contains(r#"src="images/thumbnails/photo.jpg""#));
}

#[test]
fn rebuild_without_changes_is_a_byte_identical_noop() {
    let (_tmp, config) = init_with_photo(1000, 500);
    run_build(&config);
    let first = fs::read(config.images_data_path()).unwrap();

    run_build(&config);
    let second = fs::read(config.images_data_path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn hand_edited_description_survives_rebuild() {
    let (_tmp, config) = init_with_photo(1000, 500);
    run_build(&config);

    // Edit the document the way a user would.
    let path = config.images_data_path();
    let mut document = store::load_document(&path);
    document.get_mut("photo.jpg").unwrap().description = "Sunrise over the bay".to_string();
    store::save_document(&path, &document).unwrap();

    let rebuilt = run_build(&config);
    assert_eq!(rebuilt["photo.jpg"].description, "Sunrise over the bay");

    let html = fs::read_to_string(config.public_dir().join("index.html")).unwrap();
    assert!(html.contains("Sunrise over the bay"));
}

#[test]
fn changed_file_gets_reprobed() {
    let (_tmp, config) = init_with_photo(1000, 500);
    run_build(&config);

    let path = config.images_data_path();
    let mut document = store::load_document(&path);
    document.get_mut("photo.jpg").unwrap().description = "old caption".to_string();
    store::save_document(&path, &document).unwrap();

    // Replace the photo with different content and dimensions.
    image::RgbImage::new(800, 800)
        .save(config.images_dir().join("photo.jpg"))
        .unwrap();

    let rebuilt = run_build(&config);
    let record = &rebuilt["photo.jpg"];
    assert_eq!(record.size, (800, 800));
    assert_ne!(record.description, "old caption");

    // Regeneration triggers on height only, so the existing thumbnail is
    // kept and the document keeps agreeing with the file on disk.
    let thumb = config.thumbnails_dir().join("photo.jpg");
    assert_eq!(image::image_dimensions(&thumb).unwrap(), (640, 320));
    assert_eq!(record.thumbnail_size, (320, 160));
}

#[test]
fn new_files_are_added_alongside_kept_records() {
    let (_tmp, config) = init_with_photo(1000, 500);
    run_build(&config);

    let path = config.images_data_path();
    let mut document = store::load_document(&path);
    document.get_mut("photo.jpg").unwrap().description = "kept".to_string();
    store::save_document(&path, &document).unwrap();

    image::RgbImage::new(400, 200)
        .save(config.images_dir().join("new.png"))
        .unwrap();

    let rebuilt = run_build(&config);
    assert_eq!(rebuilt.len(), 2);
    assert_eq!(rebuilt["photo.jpg"].description, "kept");
    assert_eq!(rebuilt["new.png"].size, (400, 200));
}

#[test]
fn empty_gallery_fails_with_no_items() {
    let tmp = TempDir::new().unwrap();
    let config = config::init_gallery(tmp.path(), "Empty", "", None).unwrap();
    let gallery = logic::for_config(&config);
    let backend = StandardBackend::new();

    let result = gallery.create_thumbnails(&backend, false);
    assert!(matches!(result, Err(GalleryError::NoItemsFound(_))));
}

#[test]
fn build_requires_gallery_config() {
    let tmp = TempDir::new().unwrap();
    let result = GalleryConfig::load(tmp.path());
    assert!(matches!(result, Err(GalleryError::Config(_))));
}
