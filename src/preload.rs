//! Opportunistic image preloading.
//!
//! The lightbox warms the photo it shows plus both neighbours so that
//! stepping through a gallery never waits on a cold decode. Requests go
//! through a [`PreloadCache`], an append-only set of URLs that makes every
//! request idempotent for the lifetime of the page.
//!
//! The cache itself never does I/O. The actual fetch is delegated to an
//! [`ImageFetcher`]:
//!
//! | Fetcher | Behaviour |
//! |---|---|
//! | [`DecodeFetcher`] | downloads remote URLs or resolves site-relative ones under a media root, decodes on a rayon pool, keeps the pixels in a warm store |
//! | test fakes | record calls so tests can assert fetch counts |
//!
//! Fetches are fire-and-forget. A failure only means the photo loads
//! normally later, so errors are logged at debug level and dropped.

use crate::media::{self, MediaError, MediaSource};
use image::DynamicImage;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreloadError {
    #[error("Failed to start decode pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Failed to set up HTTP client: {0}")]
    Media(#[from] MediaError),
}

/// The minimal preload interface the viewer depends on.
pub trait Preload {
    /// Ask for `url` to be warmed. Repeated requests are no-ops.
    fn request(&mut self, url: &str);

    /// Whether `url` has already been requested.
    fn has(&self, url: &str) -> bool;
}

/// Issues the underlying fetch for a URL. Must not block.
pub trait ImageFetcher {
    fn fetch(&self, url: &str);
}

impl<F: ImageFetcher + ?Sized> ImageFetcher for &F {
    fn fetch(&self, url: &str) {
        (**self).fetch(url);
    }
}

/// Append-only set of requested URLs in front of an [`ImageFetcher`].
#[derive(Debug)]
pub struct PreloadCache<F> {
    requested: HashSet<String>,
    fetcher: F,
}

impl<F: ImageFetcher> PreloadCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            requested: HashSet::new(),
            fetcher,
        }
    }

    /// Number of distinct URLs requested so far.
    pub fn len(&self) -> usize {
        self.requested.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

impl<F: ImageFetcher> Preload for PreloadCache<F> {
    fn request(&mut self, url: &str) {
        if url.is_empty() || self.requested.contains(url) {
            return;
        }
        self.requested.insert(url.to_string());
        self.fetcher.fetch(url);
    }

    fn has(&self, url: &str) -> bool {
        self.requested.contains(url)
    }
}

/// Decoded images keyed by URL. Only ever inserted into.
pub type WarmStore = Arc<Mutex<HashMap<String, Arc<DynamicImage>>>>;

/// Production fetcher: downloads or reads each image and decodes it on a
/// background pool.
pub struct DecodeFetcher {
    media_root: PathBuf,
    client: reqwest::blocking::Client,
    pool: rayon::ThreadPool,
    store: WarmStore,
}

impl DecodeFetcher {
    /// Create a fetcher with its own decode pool of `threads` workers.
    pub fn new(media_root: &Path, threads: usize) -> Result<Self, PreloadError> {
        Self::with_client(media_root, threads, media::http_client()?)
    }

    /// Like [`DecodeFetcher::new`], with a caller-supplied HTTP client.
    pub fn with_client(
        media_root: &Path,
        threads: usize,
        client: reqwest::blocking::Client,
    ) -> Result<Self, PreloadError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("preload-{i}"))
            .build()?;
        Ok(Self {
            media_root: media_root.to_path_buf(),
            client,
            pool,
            store: WarmStore::default(),
        })
    }

    /// Handle to the decoded images, shared with the decode workers.
    pub fn store(&self) -> WarmStore {
        Arc::clone(&self.store)
    }

    /// Decoded image for `url`, if its preload has completed.
    pub fn decoded(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.store.lock().ok()?.get(url).cloned()
    }
}

impl ImageFetcher for DecodeFetcher {
    fn fetch(&self, url: &str) {
        let Some(source) = media::locate(&self.media_root, url) else {
            tracing::debug!(url, "preload skipped: url has no fetchable source");
            return;
        };
        let url = url.to_string();
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        self.pool.spawn(move || match decode(&client, &source) {
            Ok(img) => {
                tracing::debug!(url = %url, width = img.width(), height = img.height(), "preloaded");
                if let Ok(mut decoded) = store.lock() {
                    decoded.insert(url, Arc::new(img));
                }
            }
            Err(err) => tracing::debug!(url = %url, error = %err, "preload failed"),
        });
    }
}

#[derive(Error, Debug)]
enum DecodeError {
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

fn decode(
    client: &reqwest::blocking::Client,
    source: &MediaSource,
) -> Result<DynamicImage, DecodeError> {
    let bytes = media::load(client, source)?;
    Ok(image::load_from_memory(&bytes)?)
}
