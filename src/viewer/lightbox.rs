//! The stateful lightbox: owns a [`ViewerState`], feeds commands through
//! [`transition`] and carries out the resulting effects.

use super::input::{InputBindings, InputEvent};
use super::state::{Command, Direction, Effect, Point, ViewerState, transition};
use crate::config::ViewerConfig;
use crate::preload::Preload;
use crate::types::{Photo, PhotoId};
use std::sync::Arc;

type ActiveListener = Box<dyn FnMut(Option<&PhotoId>)>;

/// Full-screen viewer over a fixed navigation ordering.
///
/// The ordering is the whole displayed list (a category or every photo),
/// independent of grid pagination, so stepping crosses page breaks.
pub struct Lightbox<P> {
    photos: Arc<[Photo]>,
    state: ViewerState,
    bindings: InputBindings,
    preload: P,
    on_active_change: Option<ActiveListener>,
}

impl<P: Preload> Lightbox<P> {
    pub fn new(photos: impl Into<Arc<[Photo]>>, preload: P, config: &ViewerConfig) -> Self {
        Self {
            photos: photos.into(),
            state: ViewerState::Closed,
            bindings: InputBindings::new(config),
            preload,
            on_active_change: None,
        }
    }

    /// Register the outward report of the active photo id (`None` on close).
    /// Replaces any previous listener.
    pub fn on_active_change(&mut self, listener: impl FnMut(Option<&PhotoId>) + 'static) {
        self.on_active_change = Some(Box::new(listener));
    }

    /// Apply a command. Returns `true` when the state changed.
    pub fn dispatch(&mut self, command: Command) -> bool {
        let step = transition(&self.state, &self.photos, command);
        let changed = step.state != self.state;
        self.state = step.state;
        for effect in step.effects {
            self.run(effect);
        }
        changed
    }

    /// Translate a raw input event and apply it.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match self.bindings.translate(event) {
            Some(command) => self.dispatch(command),
            None => false,
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Preload(urls) => {
                for url in &urls {
                    self.preload.request(url);
                }
            }
            Effect::Report(active) => {
                match &active {
                    Some(id) => tracing::debug!(photo = %id, "lightbox showing photo"),
                    None => tracing::debug!("lightbox closed"),
                }
                if let Some(listener) = self.on_active_change.as_mut() {
                    listener(active.as_ref());
                }
            }
        }
    }

    pub fn open(&mut self, id: &PhotoId) -> bool {
        self.dispatch(Command::Open(id.clone()))
    }

    pub fn close(&mut self) -> bool {
        self.dispatch(Command::Close)
    }

    pub fn go_to(&mut self, id: &PhotoId) -> bool {
        self.dispatch(Command::GoTo(id.clone()))
    }

    pub fn previous(&mut self) -> bool {
        self.dispatch(Command::Step(Direction::Previous))
    }

    pub fn next(&mut self) -> bool {
        self.dispatch(Command::Step(Direction::Next))
    }

    pub fn toggle_zoom(&mut self) -> bool {
        self.dispatch(Command::ToggleZoom)
    }

    /// Swap in a new navigation ordering (after a data reload). Closes the
    /// viewer when the active photo is no longer part of it.
    pub fn set_photos(&mut self, photos: impl Into<Arc<[Photo]>>) {
        self.photos = photos.into();
        let gone = self
            .state
            .active()
            .is_some_and(|id| !self.photos.iter().any(|p| &p.id == id));
        if gone {
            self.close();
        }
    }
}

impl<P> Lightbox<P> {
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_zoomed(&self) -> bool {
        self.state.is_zoomed()
    }

    pub fn pan(&self) -> Point {
        self.state.pan()
    }

    pub fn active_photo(&self) -> Option<&Photo> {
        let id = self.state.active()?;
        self.photos.iter().find(|p| &p.id == id)
    }

    /// Position of the active photo in the ordering.
    pub fn active_index(&self) -> Option<usize> {
        let id = self.state.active()?;
        super::state::index_of(&self.photos, id)
    }

    /// The photo a "previous" arrow would go to; `None` hides the arrow.
    pub fn previous_photo(&self) -> Option<&Photo> {
        let id = self.state.active()?;
        super::state::neighbor(&self.photos, id, Direction::Previous)
    }

    pub fn next_photo(&self) -> Option<&Photo> {
        let id = self.state.active()?;
        super::state::neighbor(&self.photos, id, Direction::Next)
    }

    pub fn preload(&self) -> &P {
        &self.preload
    }

    pub fn preload_mut(&mut self) -> &mut P {
        &mut self.preload
    }
}
