//! Paginated justified grid.
//!
//! [`Gallery`] owns the displayed ordering, the current page and the
//! container width. Rows are derived on demand from the current page's slice,
//! so a resize or page change simply yields different rows next time
//! [`Gallery::rows`] is called.
//!
//! Row sizing follows the configured breakpoint table (see
//! [`Breakpoints`](crate::config::Breakpoints)); the page size is fixed by
//! configuration.

use crate::config::{Breakpoints, GalleryConfig, RowSizing};
use crate::layout::{self, Row};
use crate::types::{Photo, PhotoId};
use maud::{Markup, html};
use std::ops::Range;
use std::sync::Arc;

/// Number of leading first-row images that load eagerly.
pub const EAGER_IMAGES: usize = 3;

/// 1-based page cursor over `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `ceil(total / page_size)`; zero for an empty list.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Move to `page`. Pages outside `1..=total_pages` are ignored.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// Page that holds the item at `index`.
    pub fn page_of(&self, index: usize) -> usize {
        index / self.page_size + 1
    }

    /// Item indices shown on the current page.
    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Change the item count, returning to page 1.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.page = 1;
    }
}

/// The grid over one displayed ordering (a category or every photo).
#[derive(Debug, Clone)]
pub struct Gallery {
    photos: Arc<[Photo]>,
    breakpoints: Breakpoints,
    pagination: Pagination,
    width: u32,
}

impl Gallery {
    pub fn new(photos: impl Into<Arc<[Photo]>>, config: &GalleryConfig) -> Self {
        let photos = photos.into();
        let pagination = Pagination::new(photos.len(), config.pagination.page_size);
        Self {
            photos,
            breakpoints: config.layout.breakpoints.clone(),
            pagination,
            width: 0,
        }
    }

    /// The full ordering, shared with the lightbox.
    pub fn photos(&self) -> &Arc<[Photo]> {
        &self.photos
    }

    /// Replace the ordering (category switch or data reload). Returns to
    /// page 1.
    pub fn set_photos(&mut self, photos: impl Into<Arc<[Photo]>>) {
        self.photos = photos.into();
        self.pagination.reset(self.photos.len());
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        self.pagination.set_page(page)
    }

    /// Jump to the page holding `id`. Unknown ids leave the page alone.
    pub fn show_photo(&mut self, id: &PhotoId) -> bool {
        match self.photos.iter().position(|p| &p.id == id) {
            Some(index) => {
                let page = self.pagination.page_of(index);
                self.pagination.set_page(page)
            }
            None => false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) -> bool {
        let changed = width != self.width;
        self.width = width;
        changed
    }

    /// Gap and target height for the current width.
    pub fn sizing(&self) -> RowSizing {
        self.breakpoints.sizing_for(self.width)
    }

    /// Photos on the current page.
    pub fn page_photos(&self) -> &[Photo] {
        &self.photos[self.pagination.range()]
    }

    /// Packed rows for the current page at the current width.
    pub fn rows(&self) -> Vec<Row<'_>> {
        let sizing = self.sizing();
        layout::pack(
            self.page_photos(),
            self.width,
            sizing.target_row_height,
            sizing.gap,
        )
    }

    /// Resolve a click on the grid. Only photos on the current page are
    /// clickable.
    pub fn click(&self, id: &PhotoId) -> Option<&Photo> {
        self.page_photos().iter().find(|p| &p.id == id)
    }
}

// ============================================================================
// HTML
// ============================================================================

/// Renders packed rows as a grid of links.
///
/// `href` gives each photo's link target. The first [`EAGER_IMAGES`] items of
/// the first row load eagerly, everything else lazily.
pub fn render_rows(rows: &[Row<'_>], gap: u32, href: impl Fn(&Photo) -> String) -> Markup {
    html! {
        div.justified-gallery style=(format!("--gap: {gap}px;")) {
            @for (row_idx, row) in rows.iter().enumerate() {
                div.gallery-row.incomplete[!row.complete] style=(format!("height: {}px;", row.height)) {
                    @for (item_idx, item) in row.items.iter().enumerate() {
                        @let eager = row_idx == 0 && item_idx < EAGER_IMAGES;
                        a.gallery-item
                            href=(href(item.photo))
                            data-photo-id=(item.photo.id.as_str())
                            style=(format!("width: {}px; height: {}px;", item.width, item.height)) {
                            img src=(item.photo.url)
                                alt=(item.photo.alt_text())
                                width=(item.width)
                                height=(item.height)
                                loading=(if eager { "eager" } else { "lazy" })
                                decoding="async";
                        }
                    }
                }
            }
        }
    }
}

/// Renders previous/next and numbered page links. Nothing for a single page.
pub fn render_pagination(pagination: &Pagination, href: impl Fn(usize) -> String) -> Markup {
    let current = pagination.page();
    html! {
        @if pagination.total_pages() > 1 {
            nav.pagination aria-label="Pagination" {
                @if pagination.has_previous() {
                    a.page-prev href=(href(current - 1)) rel="prev" { "‹ Previous" }
                }
                @for page in 1..=pagination.total_pages() {
                    @if page == current {
                        span.page-current aria-current="page" { (page) }
                    } @else {
                        a.page-link href=(href(page)) { (page) }
                    }
                }
                @if pagination.has_next() {
                    a.page-next href=(href(current + 1)) rel="next" { "Next ›" }
                }
            }
        }
    }
}
