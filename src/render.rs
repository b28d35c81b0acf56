//! Static HTML rendering of the gallery index.
//!
//! Deliberately thin: the document is the product, the page is a view of
//! it. One `index.html` with a thumbnail grid linking to the full-size
//! media.
//!
//! Descriptions arrive pre-escaped from the probe (`&apos;`/`&quot;`), so
//! they are emitted through `PreEscaped`; everything else goes through
//! maud's auto-escaping.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::PathBuf;

use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::store::{Document, MediaKind};

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
            }
            body {
                (content)
            }
        }
    }
}

fn gallery_header(config: &GalleryConfig) -> Markup {
    html! {
        header.gallery-header {
            h1 { (config.title) }
            @if !config.description.is_empty() {
                p.gallery-description { (config.description) }
            }
        }
    }
}

fn media_card(name: &str, record: &crate::store::MediaRecord) -> Markup {
    html! {
        a.media-card href=(record.src) data-name=(name) {
            img src=(record.thumbnail)
                width=(record.thumbnail_size.0)
                height=(record.thumbnail_size.1)
                loading="lazy"
                alt=(name);
            @if record.kind == MediaKind::Video {
                span.play-badge { "▶" }
            }
            @if !record.description.trim().is_empty() || !record.date.is_empty() {
                span.caption {
                    (PreEscaped(record.description.clone()))
                    @if !record.date.is_empty() {
                        span.date { (record.date) }
                    }
                }
            }
        }
    }
}

/// Render the gallery index page.
pub fn render_index(config: &GalleryConfig, document: &Document) -> Markup {
    let content = html! {
        (gallery_header(config))
        main.gallery {
            div.media-grid {
                @for (name, record) in document {
                    (media_card(name, record))
                }
            }
        }
    };
    base_document(&config.title, content)
}

/// Render and write `index.html` into the public directory.
pub fn write_index(config: &GalleryConfig, document: &Document) -> Result<PathBuf, GalleryError> {
    let path = config.public_dir().join("index.html");
    fs::write(&path, render_index(config, document).into_string())?;
    Ok(path)
}
