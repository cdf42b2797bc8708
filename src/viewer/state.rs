//! Pure lightbox state transitions.
//!
//! [`transition`] maps a state, the navigation ordering and a [`Command`] to
//! the next state plus the [`Effect`]s the caller must run. It never performs
//! them itself, which keeps every viewer rule testable without a fetcher.
//!
//! A command that does not apply in the current state (navigating past either
//! end, zooming while closed, a pan without a drag session) returns the state
//! unchanged with no effects.

use crate::types::{Photo, PhotoId};
use serde::{Deserialize, Serialize};

/// Screen position or offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Largest pan offset allowed on each axis, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanBounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl PanBounds {
    /// Bounds for a rendered zoomed image inside a viewport: the overflow on
    /// each side. Never negative, so an image smaller than the viewport
    /// cannot move.
    pub fn new(zoomed: Size, viewport: Size) -> Self {
        Self {
            max_x: half_overflow(zoomed.width, viewport.width),
            max_y: half_overflow(zoomed.height, viewport.height),
        }
    }

    /// Bounds for an image fitted at `fitted` size and then scaled by `scale`.
    pub fn for_zoom(fitted: Size, scale: f64, viewport: Size) -> Self {
        Self::new(
            Size::new(fitted.width * scale, fitted.height * scale),
            viewport,
        )
    }

    pub fn clamp(&self, offset: Point) -> Point {
        Point {
            x: offset.x.clamp(-self.max_x, self.max_x),
            y: offset.y.clamp(-self.max_y, self.max_y),
        }
    }
}

fn half_overflow(content: f64, viewport: f64) -> f64 {
    let overflow = (content - viewport) / 2.0;
    if overflow.is_finite() && overflow > 0.0 {
        overflow
    } else {
        0.0
    }
}

/// Host-assigned pointer identifier.
pub type PointerId = i64;

/// Bookkeeping for one pointer-down to pointer-up drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub pointer: PointerId,
    pub origin: Point,
    pub pan_at_start: Point,
    pub bounds: PanBounds,
}

/// Everything the viewer tracks while a photo is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenView {
    pub active: PhotoId,
    pub zoomed: bool,
    pub pan: Point,
    pub drag: Option<DragSession>,
}

impl OpenView {
    fn showing(active: PhotoId) -> Self {
        Self {
            active,
            zoomed: false,
            pan: Point::ORIGIN,
            drag: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open(OpenView),
}

impl ViewerState {
    pub fn active(&self) -> Option<&PhotoId> {
        match self {
            ViewerState::Closed => None,
            ViewerState::Open(view) => Some(&view.active),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ViewerState::Open(_))
    }

    pub fn is_zoomed(&self) -> bool {
        matches!(self, ViewerState::Open(view) if view.zoomed)
    }

    /// Current pan offset; the origin whenever closed or not zoomed.
    pub fn pan(&self) -> Point {
        match self {
            ViewerState::Open(view) => view.pan,
            ViewerState::Closed => Point::ORIGIN,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, ViewerState::Open(view) if view.drag.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show a photo, from either state.
    Open(PhotoId),
    Close,
    /// Replace the active photo while open.
    GoTo(PhotoId),
    /// Move to the neighbour in the navigation ordering.
    Step(Direction),
    ToggleZoom,
    /// Begin a drag session. `bounds` come from live measurements.
    DragStart {
        pointer: PointerId,
        at: Point,
        bounds: PanBounds,
    },
    /// Pan by the pointer's travel since the session started.
    DragMove { pointer: PointerId, at: Point },
    DragEnd { pointer: PointerId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Warm these URLs (current photo first, then its neighbours).
    Preload(Vec<String>),
    /// The active photo changed; `None` means the viewer closed.
    Report(Option<PhotoId>),
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: ViewerState,
    pub effects: Vec<Effect>,
}

impl Step {
    fn unchanged(state: &ViewerState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

/// Position of `id` in the ordering.
pub fn index_of(photos: &[Photo], id: &PhotoId) -> Option<usize> {
    photos.iter().position(|p| &p.id == id)
}

/// The photo before or after `id`, if any.
pub fn neighbor<'a>(photos: &'a [Photo], id: &PhotoId, direction: Direction) -> Option<&'a Photo> {
    let index = index_of(photos, id)?;
    match direction {
        Direction::Previous => index.checked_sub(1).and_then(|i| photos.get(i)),
        Direction::Next => photos.get(index + 1),
    }
}

/// URLs to warm when `index` becomes active: itself, previous, next.
pub fn preload_urls(photos: &[Photo], index: usize) -> Vec<String> {
    let mut indices = vec![index];
    if let Some(prev) = index.checked_sub(1) {
        indices.push(prev);
    }
    if index + 1 < photos.len() {
        indices.push(index + 1);
    }
    indices
        .into_iter()
        .filter_map(|i| photos.get(i))
        .map(|p| p.url.clone())
        .filter(|url| !url.is_empty())
        .collect()
}

fn show(photos: &[Photo], id: &PhotoId) -> Option<Step> {
    let index = index_of(photos, id)?;
    Some(Step {
        state: ViewerState::Open(OpenView::showing(id.clone())),
        effects: vec![
            Effect::Preload(preload_urls(photos, index)),
            Effect::Report(Some(id.clone())),
        ],
    })
}

/// Compute the next viewer state for `command`.
pub fn transition(state: &ViewerState, photos: &[Photo], command: Command) -> Step {
    let next = match (state, command) {
        (_, Command::Open(id)) => show(photos, &id),

        (ViewerState::Open(_), Command::Close) => Some(Step {
            state: ViewerState::Closed,
            effects: vec![Effect::Report(None)],
        }),

        (ViewerState::Open(_), Command::GoTo(id)) => show(photos, &id),

        (ViewerState::Open(view), Command::Step(direction)) => {
            neighbor(photos, &view.active, direction).and_then(|p| show(photos, &p.id))
        }

        (ViewerState::Open(view), Command::ToggleZoom) => Some(Step {
            state: ViewerState::Open(OpenView {
                active: view.active.clone(),
                zoomed: !view.zoomed,
                pan: Point::ORIGIN,
                drag: None,
            }),
            effects: Vec::new(),
        }),

        (
            ViewerState::Open(view),
            Command::DragStart {
                pointer,
                at,
                bounds,
            },
        ) if view.zoomed && view.drag.is_none() => Some(Step {
            state: ViewerState::Open(OpenView {
                drag: Some(DragSession {
                    pointer,
                    origin: at,
                    pan_at_start: view.pan,
                    bounds,
                }),
                ..view.clone()
            }),
            effects: Vec::new(),
        }),

        (ViewerState::Open(view), Command::DragMove { pointer, at }) => match view.drag {
            Some(drag) if view.zoomed && drag.pointer == pointer => {
                let pan = drag.bounds.clamp(Point {
                    x: drag.pan_at_start.x + (at.x - drag.origin.x),
                    y: drag.pan_at_start.y + (at.y - drag.origin.y),
                });
                Some(Step {
                    state: ViewerState::Open(OpenView {
                        pan,
                        ..view.clone()
                    }),
                    effects: Vec::new(),
                })
            }
            _ => None,
        },

        (ViewerState::Open(view), Command::DragEnd { pointer }) => match view.drag {
            Some(drag) if drag.pointer == pointer => Some(Step {
                state: ViewerState::Open(OpenView {
                    drag: None,
                    ..view.clone()
                }),
                effects: Vec::new(),
            }),
            _ => None,
        },

        _ => None,
    };
    next.unwrap_or_else(|| Step::unchanged(state))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: u64) -> Vec<Photo> {
        (1..=n)
            .map(|i| Photo {
                id: i.into(),
                name: format!("Photo {i}"),
                url: format!("/media/{i}.jpg"),
                width: Some(1200),
                height: Some(800),
                category_id: None,
            })
            .collect()
    }

    fn open_on(photos: &[Photo], id: u64) -> ViewerState {
        transition(&ViewerState::Closed, photos, Command::Open(id.into())).state
    }

    fn zoomed_on(photos: &[Photo], id: u64) -> ViewerState {
        transition(&open_on(photos, id), photos, Command::ToggleZoom).state
    }

    fn bounds(max_x: f64, max_y: f64) -> PanBounds {
        PanBounds { max_x, max_y }
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    #[test]
    fn open_shows_photo_unzoomed() {
        let photos = photos(5);
        let step = transition(&ViewerState::Closed, &photos, Command::Open(3.into()));
        assert_eq!(step.state.active(), Some(&PhotoId::from(3)));
        assert!(!step.state.is_zoomed());
        assert_eq!(step.state.pan(), Point::ORIGIN);
        assert_eq!(
            step.effects,
            vec![
                Effect::Preload(vec![
                    "/media/3.jpg".into(),
                    "/media/2.jpg".into(),
                    "/media/4.jpg".into()
                ]),
                Effect::Report(Some(3.into())),
            ]
        );
    }

    #[test]
    fn open_unknown_id_is_noop() {
        let photos = photos(3);
        let step = transition(&ViewerState::Closed, &photos, Command::Open(99.into()));
        assert_eq!(step.state, ViewerState::Closed);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn open_while_open_resets_zoom() {
        let photos = photos(3);
        let zoomed = zoomed_on(&photos, 1);
        let step = transition(&zoomed, &photos, Command::Open(2.into()));
        assert_eq!(step.state.active(), Some(&PhotoId::from(2)));
        assert!(!step.state.is_zoomed());
    }

    #[test]
    fn close_reports_none() {
        let photos = photos(3);
        let step = transition(&zoomed_on(&photos, 2), &photos, Command::Close);
        assert_eq!(step.state, ViewerState::Closed);
        assert_eq!(step.effects, vec![Effect::Report(None)]);
    }

    #[test]
    fn close_when_closed_is_noop() {
        let step = transition(&ViewerState::Closed, &photos(2), Command::Close);
        assert!(step.effects.is_empty());
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn step_moves_and_resets_zoom() {
        let photos = photos(5);
        let step = transition(
            &zoomed_on(&photos, 3),
            &photos,
            Command::Step(Direction::Next),
        );
        assert_eq!(step.state.active(), Some(&PhotoId::from(4)));
        assert!(!step.state.is_zoomed());
        assert_eq!(step.state.pan(), Point::ORIGIN);
    }

    #[test]
    fn step_past_either_end_is_noop() {
        let photos = photos(5);
        let first = open_on(&photos, 1);
        let step = transition(&first, &photos, Command::Step(Direction::Previous));
        assert_eq!(step.state, first);
        assert!(step.effects.is_empty());

        let last = open_on(&photos, 5);
        let step = transition(&last, &photos, Command::Step(Direction::Next));
        assert_eq!(step.state, last);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn navigation_requires_open_viewer() {
        let photos = photos(3);
        for command in [
            Command::GoTo(2.into()),
            Command::Step(Direction::Next),
            Command::ToggleZoom,
        ] {
            let step = transition(&ViewerState::Closed, &photos, command);
            assert_eq!(step.state, ViewerState::Closed);
            assert!(step.effects.is_empty());
        }
    }

    #[test]
    fn go_to_preloads_new_neighbourhood() {
        let photos = photos(5);
        let step = transition(&open_on(&photos, 1), &photos, Command::GoTo(5.into()));
        assert_eq!(
            step.effects[0],
            Effect::Preload(vec!["/media/5.jpg".into(), "/media/4.jpg".into()])
        );
    }

    #[test]
    fn preload_skips_empty_urls() {
        let mut photos = photos(3);
        photos[0].url.clear();
        assert_eq!(
            preload_urls(&photos, 1),
            vec!["/media/2.jpg".to_string(), "/media/3.jpg".to_string()]
        );
    }

    #[test]
    fn neighbor_at_edges() {
        let photos = photos(2);
        assert!(neighbor(&photos, &1.into(), Direction::Previous).is_none());
        assert_eq!(
            neighbor(&photos, &1.into(), Direction::Next).map(|p| p.id.as_str()),
            Some("2")
        );
        assert!(neighbor(&photos, &7.into(), Direction::Next).is_none());
    }

    // =========================================================================
    // Zoom and pan
    // =========================================================================

    #[test]
    fn toggle_zoom_resets_pan_each_time() {
        let photos = photos(1);
        let mut state = zoomed_on(&photos, 1);
        for command in [
            Command::DragStart {
                pointer: 1,
                at: Point::new(0.0, 0.0),
                bounds: bounds(100.0, 100.0),
            },
            Command::DragMove {
                pointer: 1,
                at: Point::new(30.0, -20.0),
            },
            Command::DragEnd { pointer: 1 },
        ] {
            state = transition(&state, &photos, command).state;
        }
        assert_eq!(state.pan(), Point::new(30.0, -20.0));

        let unzoomed = transition(&state, &photos, Command::ToggleZoom).state;
        assert!(!unzoomed.is_zoomed());
        assert_eq!(unzoomed.pan(), Point::ORIGIN);
        let rezoomed = transition(&unzoomed, &photos, Command::ToggleZoom).state;
        assert!(rezoomed.is_zoomed());
        assert_eq!(rezoomed.pan(), Point::ORIGIN);
    }

    #[test]
    fn pan_is_clamped_to_bounds() {
        let photos = photos(1);
        let mut state = zoomed_on(&photos, 1);
        state = transition(
            &state,
            &photos,
            Command::DragStart {
                pointer: 7,
                at: Point::new(100.0, 100.0),
                bounds: bounds(50.0, 10.0),
            },
        )
        .state;
        state = transition(
            &state,
            &photos,
            Command::DragMove {
                pointer: 7,
                at: Point::new(400.0, -300.0),
            },
        )
        .state;
        assert_eq!(state.pan(), Point::new(50.0, -10.0));
    }

    #[test]
    fn pan_accumulates_across_drags() {
        let photos = photos(1);
        let mut state = zoomed_on(&photos, 1);
        for (start, end) in [((0.0, 0.0), (10.0, 5.0)), ((50.0, 50.0), (55.0, 40.0))] {
            state = transition(
                &state,
                &photos,
                Command::DragStart {
                    pointer: 1,
                    at: Point::new(start.0, start.1),
                    bounds: bounds(100.0, 100.0),
                },
            )
            .state;
            state = transition(
                &state,
                &photos,
                Command::DragMove {
                    pointer: 1,
                    at: Point::new(end.0, end.1),
                },
            )
            .state;
            state = transition(&state, &photos, Command::DragEnd { pointer: 1 }).state;
        }
        assert_eq!(state.pan(), Point::new(15.0, -5.0));
    }

    #[test]
    fn drag_requires_zoom() {
        let photos = photos(1);
        let open = open_on(&photos, 1);
        let step = transition(
            &open,
            &photos,
            Command::DragStart {
                pointer: 1,
                at: Point::ORIGIN,
                bounds: bounds(100.0, 100.0),
            },
        );
        assert!(!step.state.is_dragging());
    }

    #[test]
    fn drag_sessions_are_exclusive() {
        let photos = photos(1);
        let mut state = zoomed_on(&photos, 1);
        state = transition(
            &state,
            &photos,
            Command::DragStart {
                pointer: 1,
                at: Point::ORIGIN,
                bounds: bounds(100.0, 100.0),
            },
        )
        .state;

        let second = transition(
            &state,
            &photos,
            Command::DragStart {
                pointer: 2,
                at: Point::new(40.0, 40.0),
                bounds: bounds(100.0, 100.0),
            },
        );
        assert_eq!(second.state, state);

        let foreign_move = transition(
            &state,
            &photos,
            Command::DragMove {
                pointer: 2,
                at: Point::new(80.0, 0.0),
            },
        );
        assert_eq!(foreign_move.state.pan(), Point::ORIGIN);

        let foreign_up = transition(&state, &photos, Command::DragEnd { pointer: 2 });
        assert!(foreign_up.state.is_dragging());
    }

    #[test]
    fn move_without_session_is_ignored() {
        let photos = photos(1);
        let state = zoomed_on(&photos, 1);
        let step = transition(
            &state,
            &photos,
            Command::DragMove {
                pointer: 1,
                at: Point::new(20.0, 20.0),
            },
        );
        assert_eq!(step.state, state);
    }

    // =========================================================================
    // Pan bounds
    // =========================================================================

    #[test]
    fn bounds_are_half_the_overflow() {
        let b = PanBounds::new(Size::new(1800.0, 900.0), Size::new(1200.0, 1000.0));
        assert_eq!(b, bounds(300.0, 0.0));
    }

    #[test]
    fn bounds_for_zoom_scale_fitted_size() {
        let b = PanBounds::for_zoom(Size::new(1000.0, 500.0), 1.8, Size::new(1200.0, 800.0));
        assert!((b.max_x - 300.0).abs() < 1e-9);
        assert!((b.max_y - 50.0).abs() < 1e-9);
    }
}
