//! Locating the bytes behind photo URLs.
//!
//! Photo URLs are either remote (`https://storage.example.com/dawn.jpg`, the
//! usual case for catalogs served by a storage bucket) or site-relative
//! (`/media/dawn.jpg`). Tools that need the actual bytes (preloading,
//! dimension backfill) fetch remote URLs over HTTP and resolve site-relative
//! ones against a media root directory. Inline `data:` URLs are not fetched.

use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Upper bound on one image download.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Images larger than this are refused rather than buffered.
const MAX_IMAGE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Image exceeds the 64 MiB download limit")]
    TooLarge,
}

/// Where the bytes of one photo live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    Remote(String),
}

impl MediaSource {
    /// Path or URL, for messages.
    pub fn display(&self) -> String {
        match self {
            MediaSource::File(path) => path.display().to_string(),
            MediaSource::Remote(url) => url.clone(),
        }
    }
}

/// Classify a photo URL.
///
/// `http(s)://` URLs are remote; protocol-relative `//host/...` URLs are
/// fetched over https. Everything else goes through [`resolve`].
pub fn locate(media_root: &Path, url: &str) -> Option<MediaSource> {
    let url = url.trim();
    if is_http(url) {
        return Some(MediaSource::Remote(url.to_string()));
    }
    if let Some(rest) = url.strip_prefix("//") {
        if rest.is_empty() {
            return None;
        }
        return Some(MediaSource::Remote(format!("https://{rest}")));
    }
    resolve(media_root, url).map(MediaSource::File)
}

fn is_http(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// HTTP client used for remote images. Honours the usual proxy variables.
pub fn http_client() -> Result<reqwest::blocking::Client, MediaError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("justified-gal/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Read all bytes of a source. Remote sources must answer with a success
/// status.
pub fn load(
    client: &reqwest::blocking::Client,
    source: &MediaSource,
) -> Result<Vec<u8>, MediaError> {
    match source {
        MediaSource::File(path) => Ok(std::fs::read(path)?),
        MediaSource::Remote(url) => {
            let response = client.get(url.as_str()).send()?.error_for_status()?;
            if response
                .content_length()
                .is_some_and(|len| len > MAX_IMAGE_BYTES)
            {
                return Err(MediaError::TooLarge);
            }
            let mut bytes = Vec::new();
            response
                .take(MAX_IMAGE_BYTES + 1)
                .read_to_end(&mut bytes)?;
            if bytes.len() as u64 > MAX_IMAGE_BYTES {
                return Err(MediaError::TooLarge);
            }
            Ok(bytes)
        }
    }
}

/// Resolve a photo URL to a path under `media_root`.
///
/// Returns `None` for remote (`http://`, `https://`, `//host`), `data:` URLs,
/// and anything that would escape the root via `..`. Query strings and
/// fragments are dropped.
pub fn resolve(media_root: &Path, url: &str) -> Option<PathBuf> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("//") || has_scheme(url) {
        return None;
    }

    let path_part = url.split(['?', '#']).next().unwrap_or_default();
    let relative = Path::new(path_part.trim_start_matches('/'));

    let mut resolved = media_root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if resolved == media_root {
        None
    } else {
        Some(resolved)
    }
}

/// `scheme:` prefix per RFC 3986 (letter, then letters/digits/`+-.`).
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
