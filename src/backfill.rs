//! Dimension backfill.
//!
//! Photos without intrinsic dimensions still lay out (at the fallback aspect
//! ratio), but their rows come out wrong. Backfill probes the image behind
//! each such photo (downloading remote URLs, reading site-relative ones from
//! the media root) and writes the real width and height back into the
//! catalog.
//!
//! Photos that already carry dimensions are never touched. URLs with nothing
//! to fetch (`data:`, empty, escaping the root) are skipped; a probe that
//! fails is reported and the photo keeps its fallback ratio.
//!
//! Probing runs in parallel with rayon. Results are applied in catalog order
//! once every probe has finished, and progress events are streamed over an
//! optional channel as probes complete.

use crate::catalog::{Catalog, CatalogError};
use crate::media::{self, MediaError, MediaSource};
use crate::types::PhotoId;
use image::ImageReader;
use std::io::Cursor;
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackfillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CatalogError> for BackfillError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Io(e) => BackfillError::Io(e),
            CatalogError::Json(e) => BackfillError::Json(e),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Download failed: {0}")]
    Media(#[from] MediaError),
    #[error("Image reports zero size")]
    Empty,
}

/// Reads intrinsic pixel dimensions from a local file or remote image.
pub trait DimensionProbe: Sync {
    fn probe(&self, source: &MediaSource) -> Result<(u32, u32), ProbeError>;
}

/// Probe backed by the `image` crate. Only the header is decoded; remote
/// images are downloaded first.
#[derive(Debug, Clone)]
pub struct ImageProbe {
    client: reqwest::blocking::Client,
}

impl ImageProbe {
    pub fn new() -> Result<Self, ProbeError> {
        Ok(Self::with_client(media::http_client()?))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl DimensionProbe for ImageProbe {
    fn probe(&self, source: &MediaSource) -> Result<(u32, u32), ProbeError> {
        let (width, height) = match source {
            MediaSource::File(path) => ImageReader::open(path)?
                .with_guessed_format()?
                .into_dimensions()?,
            MediaSource::Remote(_) => {
                let bytes = media::load(&self.client, source)?;
                ImageReader::new(Cursor::new(bytes))
                    .with_guessed_format()?
                    .into_dimensions()?
            }
        };
        if width == 0 || height == 0 {
            return Err(ProbeError::Empty);
        }
        Ok((width, height))
    }
}

/// Outcome for one photo that was missing dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum BackfillEvent {
    Filled {
        id: PhotoId,
        name: String,
        width: u32,
        height: u32,
    },
    /// The URL has nothing to fetch (inline data, or a path escaping the
    /// media root).
    Skipped {
        id: PhotoId,
        name: String,
        url: String,
    },
    Failed {
        id: PhotoId,
        name: String,
        url: String,
        error: String,
    },
}

/// Totals over one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// Photos that already had dimensions.
    pub sized: usize,
    pub filled: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BackfillSummary {
    /// Whether the catalog changed and should be written back.
    pub fn changed(&self) -> bool {
        self.filled > 0
    }
}

/// Fill in missing photo dimensions from files under `media_root`.
pub fn backfill(
    catalog: &mut Catalog,
    media_root: &Path,
    probe: &impl DimensionProbe,
    progress: Option<Sender<BackfillEvent>>,
) -> BackfillSummary {
    let pending: Vec<usize> = catalog
        .photos
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.has_dimensions())
        .map(|(i, _)| i)
        .collect();

    let mut summary = BackfillSummary {
        sized: catalog.photos.len() - pending.len(),
        ..Default::default()
    };

    let photos = &catalog.photos;
    let events: Vec<(usize, BackfillEvent)> = pending
        .par_iter()
        .map(|&index| {
            let photo = &photos[index];
            let event = match media::locate(media_root, &photo.url) {
                None => BackfillEvent::Skipped {
                    id: photo.id.clone(),
                    name: photo.name.clone(),
                    url: photo.url.clone(),
                },
                Some(source) => match probe.probe(&source) {
                    Ok((width, height)) => BackfillEvent::Filled {
                        id: photo.id.clone(),
                        name: photo.name.clone(),
                        width,
                        height,
                    },
                    Err(err) => {
                        tracing::debug!(photo = %photo.id, source = %source.display(), error = %err, "probe failed");
                        BackfillEvent::Failed {
                            id: photo.id.clone(),
                            name: photo.name.clone(),
                            url: photo.url.clone(),
                            error: err.to_string(),
                        }
                    }
                },
            };
            if let Some(tx) = &progress {
                tx.send(event.clone()).ok();
            }
            (index, event)
        })
        .collect();

    for (index, event) in events {
        match event {
            BackfillEvent::Filled { width, height, .. } => {
                let photo = &mut catalog.photos[index];
                photo.width = Some(width);
                photo.height = Some(height);
                summary.filled += 1;
            }
            BackfillEvent::Skipped { .. } => summary.skipped += 1,
            BackfillEvent::Failed { .. } => summary.failed += 1,
        }
    }

    tracing::info!(
        filled = summary.filled,
        skipped = summary.skipped,
        failed = summary.failed,
        "backfill finished"
    );
    summary
}

/// Load a catalog file, backfill it, and write it back when anything was
/// filled (unless `dry_run`).
pub fn backfill_file(
    catalog_path: &Path,
    media_root: &Path,
    probe: &impl DimensionProbe,
    dry_run: bool,
    progress: Option<Sender<BackfillEvent>>,
) -> Result<BackfillSummary, BackfillError> {
    let mut catalog = crate::catalog::load_catalog(catalog_path)?;
    let summary = backfill(&mut catalog, media_root, probe, progress);
    if summary.changed() && !dry_run {
        crate::catalog::save_catalog(&catalog, catalog_path)?;
    }
    Ok(summary)
}
