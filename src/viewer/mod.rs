//! Lightbox viewer.
//!
//! | Layer | Role |
//! |---|---|
//! | [`state`] | pure [`transition`] over [`ViewerState`], emits [`Effect`]s |
//! | [`input`] | keys, swipes, clicks and pointer drags → [`Command`]s |
//! | [`lightbox`] | [`Lightbox`] dispatcher: runs effects through a [`Preload`](crate::preload::Preload) and reports the active photo |

pub mod input;
pub mod lightbox;
pub mod state;

pub use input::{InputBindings, InputEvent, Key};
pub use lightbox::Lightbox;
pub use state::{
    Command, Direction, DragSession, Effect, OpenView, PanBounds, Point, PointerId, Size, Step,
    ViewerState, transition,
};
