//! Static HTML generation.
//!
//! Renders the catalog as a static site. Every grid page is laid out with the
//! same packing engine the interactive gallery uses, at the configured
//! snapshot width. Every photo gets a viewer page whose previous/next links
//! and preload hints come from a [`Lightbox`] opened on that photo.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                      # All photos, page 1
//! ├── page/2.html                     # All photos, later pages
//! ├── photo/17.html                   # Viewer page per photo
//! ├── category/3/index.html           # One section per category
//! ├── category/3/page/2.html
//! ├── category/3/photo/17.html        # Viewer within the category ordering
//! └── style.css
//! ```
//!
//! A photo appears once in the root section and once more in its category.
//! Navigation on a category viewer page stays within that category.
//!
//! ## Static assets
//!
//! Embedded at compile time:
//! - `static/style.css`: written next to the pages
//! - `static/viewer.js`: keyboard, swipe, and zoom on viewer pages
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::catalog::Catalog;
use crate::config::GalleryConfig;
use crate::gallery::{self, Gallery, Pagination};
use crate::preload::Preload;
use crate::types::{Category, CategoryId, Photo, RecordId};
use crate::viewer::Lightbox;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/viewer.js");

/// What was written for one gallery section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionReport {
    pub title: String,
    /// Site-relative path of the section's first grid page.
    pub index_path: String,
    pub photo_count: usize,
    pub grid_pages: usize,
    pub photo_pages: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateReport {
    pub sections: Vec<SectionReport>,
}

impl GenerateReport {
    pub fn grid_pages(&self) -> usize {
        self.sections.iter().map(|s| s.grid_pages).sum()
    }

    pub fn photo_pages(&self) -> usize {
        self.sections.iter().map(|s| s.photo_pages).sum()
    }
}

/// One displayed ordering: every photo, or one category.
struct Section<'a> {
    title: String,
    category: Option<&'a Category>,
    /// URL prefix, always ending in `/`.
    prefix: String,
    photos: Vec<Photo>,
}

impl Section<'_> {
    fn grid_href(&self, page: usize) -> String {
        grid_href(&self.prefix, page)
    }

    fn photo_href(&self, photo: &Photo) -> String {
        format!("{}photo/{}.html", self.prefix, path_segment(&photo.id))
    }
}

fn grid_href(prefix: &str, page: usize) -> String {
    if page <= 1 {
        prefix.to_string()
    } else {
        format!("{prefix}page/{page}.html")
    }
}

/// File for a site-relative URL produced by [`grid_href`] or a photo href.
fn output_path(output_dir: &Path, href: &str) -> PathBuf {
    let relative = href.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') {
        output_dir.join(relative).join("index.html")
    } else {
        output_dir.join(relative)
    }
}

/// Make a record id safe to use as a single path segment.
///
/// ASCII letters, digits, `-` and `_` pass through; every other byte becomes
/// `~XX` (uppercase hex). `~` is URL-unreserved and never passes through on its
/// own, so distinct ids always map to distinct files. The empty id is `~`.
pub fn path_segment(id: &RecordId) -> String {
    let raw = id.as_str();
    if raw.is_empty() {
        return "~".to_string();
    }
    let mut segment = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            segment.push(byte as char);
        } else {
            segment.push_str(&format!("~{byte:02X}"));
        }
    }
    segment
}

/// Preload sink that only records what the viewer asked for.
#[derive(Debug, Default)]
struct PreloadHints {
    urls: Vec<String>,
}

impl Preload for PreloadHints {
    fn request(&mut self, url: &str) {
        if !url.is_empty() && !self.has(url) {
            self.urls.push(url.to_string());
        }
    }

    fn has(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }
}

pub fn generate(
    catalog: &Catalog,
    config: &GalleryConfig,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;
    fs::write(output_dir.join("style.css"), CSS)?;

    let mut sections = vec![Section {
        title: "Gallery".to_string(),
        category: None,
        prefix: "/".to_string(),
        photos: catalog.photos.clone(),
    }];
    for category in &catalog.categories {
        sections.push(Section {
            title: category.name.clone(),
            category: Some(category),
            prefix: format!("/category/{}/", path_segment(&category.id)),
            photos: catalog.photos_in_category(&category.id),
        });
    }

    let mut report = GenerateReport::default();
    for section in &sections {
        let section_report = write_section(section, &catalog.categories, config, output_dir)?;
        tracing::debug!(
            section = %section_report.title,
            grid_pages = section_report.grid_pages,
            photo_pages = section_report.photo_pages,
            "section written"
        );
        report.sections.push(section_report);
    }
    Ok(report)
}

fn write_section(
    section: &Section<'_>,
    categories: &[Category],
    config: &GalleryConfig,
    output_dir: &Path,
) -> Result<SectionReport, GenerateError> {
    let mut gallery = Gallery::new(section.photos.clone(), config);
    gallery.set_width(config.layout.snapshot_width);

    let total_pages = gallery.pagination().total_pages().max(1);
    for page in 1..=total_pages {
        gallery.set_page(page);
        let html = render_grid_page(section, &gallery, categories);
        write_page(output_dir, &section.grid_href(page), html)?;
    }

    let pagination = *gallery.pagination();
    let mut lightbox = Lightbox::new(
        section.photos.clone(),
        PreloadHints::default(),
        &config.viewer,
    );
    for (index, photo) in section.photos.iter().enumerate() {
        lightbox.preload_mut().urls.clear();
        lightbox.open(&photo.id);
        let back = section.grid_href(pagination.page_of(index));
        let html = render_photo_page(section, &lightbox, &back, config);
        write_page(output_dir, &section.photo_href(photo), html)?;
    }

    Ok(SectionReport {
        title: section.title.clone(),
        index_path: section.prefix.trim_start_matches('/').to_string() + "index.html",
        photo_count: section.photos.len(),
        grid_pages: total_pages,
        photo_pages: section.photos.len(),
    })
}

fn write_page(output_dir: &Path, href: &str, html: Markup) -> Result<(), GenerateError> {
    let path = output_path(output_dir, href);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html.into_string())?;
    Ok(())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, head: Markup, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                link rel="stylesheet" href="/style.css";
                (head)
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

/// Renders the site header with breadcrumb and category links
fn site_header(breadcrumb: Markup, nav: Markup) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                (breadcrumb)
            }
            nav.categories {
                (nav)
            }
        }
    }
}

/// Category filter links, "All" first, then categories in the given order.
pub fn render_category_nav(categories: &[Category], current: Option<&CategoryId>) -> Markup {
    html! {
        ul {
            li class=[current.is_none().then_some("current")] {
                a href="/" { "All" }
            }
            @for category in categories {
                @let is_current = current == Some(&category.id);
                li class=[is_current.then_some("current")] {
                    a href={ "/category/" (path_segment(&category.id)) "/" } { (category.name) }
                }
            }
        }
    }
}

fn breadcrumb(section: &Section<'_>) -> Markup {
    html! {
        a href="/" { "Gallery" }
        @if let Some(category) = section.category {
            " › "
            a href=(section.prefix) { (category.name) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_grid_page(section: &Section<'_>, gallery: &Gallery, categories: &[Category]) -> Markup {
    let nav = render_category_nav(categories, section.category.map(|c| &c.id));
    let pagination: &Pagination = gallery.pagination();
    let rows = gallery.rows();
    let sizing = gallery.sizing();

    let title = if pagination.page() > 1 {
        format!("{} - Page {}", section.title, pagination.page())
    } else {
        section.title.clone()
    };

    let content = html! {
        (site_header(breadcrumb(section), nav))
        main.gallery-page {
            @if rows.is_empty() {
                p.empty-gallery { "No photos yet." }
            } @else {
                (gallery::render_rows(&rows, sizing.gap, |photo| section.photo_href(photo)))
            }
            (gallery::render_pagination(pagination, |page| section.grid_href(page)))
        }
    };

    base_document(&title, html! {}, None, content)
}

fn render_photo_page(
    section: &Section<'_>,
    lightbox: &Lightbox<PreloadHints>,
    back_href: &str,
    config: &GalleryConfig,
) -> Markup {
    let Some(photo) = lightbox.active_photo() else {
        return html! {};
    };
    let prev_href = lightbox.previous_photo().map(|p| section.photo_href(p));
    let next_href = lightbox.next_photo().map(|p| section.photo_href(p));

    let head = html! {
        @for url in lightbox.preload().urls.iter().filter(|u| **u != photo.url) {
            link rel="preload" as="image" href=(url);
        }
    };

    let position = lightbox.active_index().map(|i| i + 1).unwrap_or(1);
    let title = if photo.name.trim().is_empty() {
        format!("{} - {}", section.title, position)
    } else {
        format!("{} - {}", section.title, photo.name)
    };

    let content = html! {
        div.viewer role="dialog" aria-modal="true" aria-label=(photo.alt_text())
            data-close=(back_href)
            data-prev=[prev_href.as_deref()]
            data-next=[next_href.as_deref()]
            data-swipe-threshold=(config.viewer.swipe_threshold.to_string())
            data-zoom-scale=(config.viewer.zoom_scale.to_string()) {
            a.viewer-close href=(back_href) aria-label="Close" { "×" }
            @if let Some(href) = &prev_href {
                a.viewer-prev href=(href) rel="prev" aria-label="Previous photo" { "‹" }
            }
            figure.viewer-frame {
                img src=(photo.url)
                    alt=(photo.alt_text())
                    width=[photo.width]
                    height=[photo.height]
                    decoding="async";
                @if !photo.name.trim().is_empty() {
                    figcaption { (photo.name) }
                }
            }
            @if let Some(href) = &next_href {
                a.viewer-next href=(href) rel="next" aria-label="Next photo" { "›" }
            }
        }
        script { (PreEscaped(JS)) }
    };

    base_document(&title, head, Some("viewer-open"), content)
}

// ============================================================================
// Tests
// ============================================================================
