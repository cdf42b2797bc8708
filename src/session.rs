//! Scripted viewer sessions.
//!
//! A session script is JSON lines, one event per line, tagged by `event`:
//!
//! ```text
//! {"event": "mount", "width": 1280}
//! {"event": "click", "photo": 17}
//! {"event": "key", "key": "ArrowRight"}
//! {"event": "image-click"}
//! {"event": "pointer-down", "pointer": 1, "x": 600, "y": 400,
//!  "image": {"width": 1000, "height": 640}, "viewport": {"width": 1280, "height": 800}}
//! {"event": "pointer-move", "pointer": 1, "x": 480, "y": 380}
//! {"event": "pointer-up", "pointer": 1}
//! {"event": "key", "key": "Escape"}
//! ```
//!
//! Host events (`mount`, `resize`, `unmount`, `page`, `click`, `deep-link`)
//! drive the page; everything else is viewer input (see
//! [`InputEvent`](crate::viewer::InputEvent)). Blank lines and lines starting
//! with `#` are ignored.
//!
//! Replaying a script yields one [`Snapshot`] per event, so the whole
//! interaction can be inspected or asserted step by step.

use crate::page::GalleryPage;
use crate::preload::Preload;
use crate::types::PhotoId;
use crate::viewer::{InputEvent, ViewerState};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Events addressed to the page rather than the open viewer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum HostEvent {
    /// Host element mounted with its measured width (absent: not rendered).
    Mount {
        #[serde(default)]
        width: Option<f64>,
    },
    Resize {
        #[serde(default)]
        width: Option<f64>,
    },
    Unmount,
    Page {
        page: usize,
    },
    Click {
        photo: PhotoId,
    },
    DeepLink {
        photo: PhotoId,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SessionEvent {
    Host(HostEvent),
    Input(InputEvent),
}

/// Page and viewer state after one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// 1-based line number of the event in the script.
    pub line: usize,
    pub event: SessionEvent,
    /// Whether the event changed anything.
    pub changed: bool,
    pub width: u32,
    pub page: usize,
    pub total_pages: usize,
    /// Height and item count of every row on the current page.
    pub rows: Vec<(u32, usize)>,
    pub viewer: ViewerState,
}

/// Parse a script. Returns each event with its line number.
pub fn parse_script(content: &str) -> Result<Vec<(usize, SessionEvent)>, SessionError> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line)
                .map(|event| (line_no, event))
                .map_err(|source| SessionError::Json {
                    line: line_no,
                    source,
                })
        })
        .collect()
}

pub fn load_script(path: &Path) -> Result<Vec<(usize, SessionEvent)>, SessionError> {
    let content = fs::read_to_string(path)?;
    parse_script(&content)
}

/// Apply one event. Returns `true` when the page or viewer changed.
pub fn apply<P: Preload>(page: &mut GalleryPage<P>, event: &SessionEvent) -> bool {
    match event {
        SessionEvent::Host(HostEvent::Mount { width }) => page.mount(*width),
        SessionEvent::Host(HostEvent::Resize { width }) => page.resize(*width),
        SessionEvent::Host(HostEvent::Unmount) => {
            page.unmount();
            false
        }
        SessionEvent::Host(HostEvent::Page { page: n }) => page.set_page(*n),
        SessionEvent::Host(HostEvent::Click { photo }) => page.click(photo),
        SessionEvent::Host(HostEvent::DeepLink { photo }) => page.open_deep_link(photo),
        SessionEvent::Input(input) => page.handle(input),
    }
}

/// Capture the current state of `page`.
pub fn snapshot<P: Preload>(
    page: &GalleryPage<P>,
    line: usize,
    event: SessionEvent,
    changed: bool,
) -> Snapshot {
    let pagination = page.gallery().pagination();
    Snapshot {
        line,
        event,
        changed,
        width: page.width(),
        page: pagination.page(),
        total_pages: pagination.total_pages(),
        rows: page
            .rows()
            .iter()
            .map(|row| (row.height, row.items.len()))
            .collect(),
        viewer: page.lightbox().state().clone(),
    }
}

/// Run every event through `page`, collecting a snapshot after each.
pub fn replay<P: Preload>(
    page: &mut GalleryPage<P>,
    events: Vec<(usize, SessionEvent)>,
) -> Vec<Snapshot> {
    events
        .into_iter()
        .map(|(line, event)| {
            let changed = apply(page, &event);
            tracing::trace!(line, changed, "session event applied");
            snapshot(page, line, event, changed)
        })
        .collect()
}
