//! A gallery page: width observer, grid and lightbox wired together.
//!
//! [`GalleryPage`] is what a host embeds. It forwards size notifications to
//! the grid, turns grid clicks into lightbox opens and handles deep links of
//! the form `?photo=<id>`, which open the viewer and move the grid to the
//! page holding that photo.

use crate::config::GalleryConfig;
use crate::gallery::Gallery;
use crate::layout::Row;
use crate::preload::Preload;
use crate::types::{Photo, PhotoId};
use crate::viewer::state::index_of;
use crate::viewer::{InputEvent, Lightbox};
use crate::width::WidthObserver;
use std::sync::Arc;

/// Query parameter carrying the viewer's active photo.
pub const PHOTO_PARAM: &str = "photo";

pub struct GalleryPage<P> {
    observer: WidthObserver,
    gallery: Gallery,
    lightbox: Lightbox<P>,
    warm_current_page: bool,
}

impl<P: Preload> GalleryPage<P> {
    pub fn new(photos: impl Into<Arc<[Photo]>>, config: &GalleryConfig, preload: P) -> Self {
        let photos: Arc<[Photo]> = photos.into();
        Self {
            observer: WidthObserver::new(),
            gallery: Gallery::new(Arc::clone(&photos), config),
            lightbox: Lightbox::new(photos, preload, &config.viewer),
            warm_current_page: config.preload.warm_current_page,
        }
    }

    /// The host element appeared; take its first measurement.
    pub fn mount(&mut self, measured: Option<f64>) -> bool {
        let changed = self.observer.attach(measured);
        self.warm_page();
        self.apply_width(changed)
    }

    pub fn unmount(&mut self) {
        self.observer.detach();
    }

    /// Size notification from the host. Returns `true` when the grid needs
    /// to be laid out again.
    pub fn resize(&mut self, measured: Option<f64>) -> bool {
        let changed = self.observer.observe(measured);
        self.apply_width(changed)
    }

    fn apply_width(&mut self, changed: Option<u32>) -> bool {
        changed.is_some_and(|width| self.gallery.set_width(width))
    }

    /// Current rows of the grid.
    pub fn rows(&self) -> Vec<Row<'_>> {
        self.gallery.rows()
    }

    /// Switch grid page. Out-of-range pages are ignored.
    pub fn set_page(&mut self, page: usize) -> bool {
        let changed = self.gallery.set_page(page);
        if changed {
            self.warm_page();
        }
        changed
    }

    /// A photo on the grid was clicked.
    pub fn click(&mut self, id: &PhotoId) -> bool {
        let Some(photo) = self.gallery.click(id) else {
            return false;
        };
        let id = photo.id.clone();
        self.lightbox.open(&id)
    }

    /// Pre-open the viewer on an externally supplied id and show the grid
    /// page that holds it. The grid moves even when the viewer already shows
    /// that photo.
    pub fn open_deep_link(&mut self, id: &PhotoId) -> bool {
        if index_of(self.lightbox.photos(), id).is_none() {
            return false;
        }
        let opened = self.lightbox.open(id);
        let moved = self.gallery.show_photo(id);
        if moved {
            self.warm_page();
        }
        opened || moved
    }

    /// Feed a raw viewer input event to the lightbox.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        self.lightbox.handle(event)
    }

    /// Replace the displayed ordering (category switch or data reload).
    pub fn set_photos(&mut self, photos: impl Into<Arc<[Photo]>>) {
        let photos: Arc<[Photo]> = photos.into();
        self.gallery.set_photos(Arc::clone(&photos));
        self.lightbox.set_photos(photos);
        self.warm_page();
    }

    fn warm_page(&mut self) {
        if !self.warm_current_page {
            return;
        }
        for photo in self.gallery.page_photos() {
            self.lightbox.preload_mut().request(&photo.url);
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn lightbox(&self) -> &Lightbox<P> {
        &self.lightbox
    }

    pub fn lightbox_mut(&mut self) -> &mut Lightbox<P> {
        &mut self.lightbox
    }

    pub fn width(&self) -> u32 {
        self.observer.width()
    }

    /// Query string reflecting the open photo, for the address bar.
    pub fn location_query(&self) -> Option<String> {
        self.lightbox.state().active().map(share_query)
    }
}

/// `?photo=<id>`
pub fn share_query(id: &PhotoId) -> String {
    format!("?{PHOTO_PARAM}={id}")
}

/// Extract the photo id from a query string such as `?page=2&photo=17`.
pub fn parse_deep_link(query: &str) -> Option<PhotoId> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == PHOTO_PARAM)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .map(PhotoId::from)
}
