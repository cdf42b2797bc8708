//! Raw viewer input and its mapping onto [`Command`]s.
//!
//! | Input | Command |
//! |---|---|
//! | `Escape`, backdrop click, close button | close |
//! | `ArrowLeft`, prev button, swipe right | previous |
//! | `ArrowRight`, next button, swipe left | next |
//! | click on the image | toggle zoom |
//! | pointer down / move / up while zoomed | drag to pan |
//!
//! Bindings only translate. Whether a command applies (the viewer is open,
//! zoomed, has a neighbour) is decided by the state machine.

use super::state::{Command, Direction, PanBounds, Point, PointerId, Size};
use crate::config::ViewerConfig;
use serde::Deserialize;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` name. Other keys are not bound.
    pub fn from_name(name: &str) -> Option<Key> {
        match name {
            "Escape" | "Esc" => Some(Key::Escape),
            "ArrowLeft" | "Left" => Some(Key::ArrowLeft),
            "ArrowRight" | "Right" => Some(Key::ArrowRight),
            _ => None,
        }
    }

    pub fn command(self) -> Command {
        match self {
            Key::Escape => Command::Close,
            Key::ArrowLeft => Command::Step(Direction::Previous),
            Key::ArrowRight => Command::Step(Direction::Next),
        }
    }
}

/// A raw event delivered to the open viewer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum InputEvent {
    Key {
        key: String,
    },
    /// First touch point; `x` is absent when the touch list was empty.
    TouchStart {
        #[serde(default)]
        x: Option<f64>,
    },
    TouchEnd {
        #[serde(default)]
        x: Option<f64>,
    },
    ImageClick,
    BackdropClick,
    Prev,
    Next,
    Close,
    /// `image` is the fitted (unzoomed) size of the photo on screen.
    PointerDown {
        pointer: PointerId,
        x: f64,
        y: f64,
        image: Size,
        viewport: Size,
    },
    PointerMove {
        pointer: PointerId,
        x: f64,
        y: f64,
    },
    PointerUp {
        pointer: PointerId,
    },
    PointerCancel {
        pointer: PointerId,
    },
}

/// Translates [`InputEvent`]s, tracking the one piece of gesture state
/// (where the current touch began) that spans events.
#[derive(Debug, Clone)]
pub struct InputBindings {
    swipe_threshold: f64,
    zoom_scale: f64,
    touch_start_x: Option<f64>,
}

impl InputBindings {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            swipe_threshold: config.swipe_threshold,
            zoom_scale: config.zoom_scale,
            touch_start_x: None,
        }
    }

    pub fn translate(&mut self, event: &InputEvent) -> Option<Command> {
        match event {
            InputEvent::Key { key } => Key::from_name(key).map(Key::command),
            InputEvent::TouchStart { x } => {
                self.touch_start_x = *x;
                None
            }
            InputEvent::TouchEnd { x } => {
                let start = self.touch_start_x.take()?;
                let end = (*x)?;
                self.swipe(end - start)
            }
            InputEvent::ImageClick => Some(Command::ToggleZoom),
            InputEvent::BackdropClick | InputEvent::Close => Some(Command::Close),
            InputEvent::Prev => Some(Command::Step(Direction::Previous)),
            InputEvent::Next => Some(Command::Step(Direction::Next)),
            InputEvent::PointerDown {
                pointer,
                x,
                y,
                image,
                viewport,
            } => Some(Command::DragStart {
                pointer: *pointer,
                at: Point::new(*x, *y),
                bounds: PanBounds::for_zoom(*image, self.zoom_scale, *viewport),
            }),
            InputEvent::PointerMove { pointer, x, y } => Some(Command::DragMove {
                pointer: *pointer,
                at: Point::new(*x, *y),
            }),
            InputEvent::PointerUp { pointer } | InputEvent::PointerCancel { pointer } => {
                Some(Command::DragEnd { pointer: *pointer })
            }
        }
    }

    /// Finger moved right past the threshold: previous. Left: next.
    fn swipe(&self, delta: f64) -> Option<Command> {
        if delta > self.swipe_threshold {
            Some(Command::Step(Direction::Previous))
        } else if delta < -self.swipe_threshold {
            Some(Command::Step(Direction::Next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> InputBindings {
        InputBindings::new(&ViewerConfig::default())
    }

    fn swipe(bindings: &mut InputBindings, from: f64, to: f64) -> Option<Command> {
        assert_eq!(
            bindings.translate(&InputEvent::TouchStart { x: Some(from) }),
            None
        );
        bindings.translate(&InputEvent::TouchEnd { x: Some(to) })
    }

    #[test]
    fn keys_map_to_commands() {
        let mut b = bindings();
        let key = |k: &str| InputEvent::Key { key: k.into() };
        assert_eq!(b.translate(&key("Escape")), Some(Command::Close));
        assert_eq!(
            b.translate(&key("ArrowLeft")),
            Some(Command::Step(Direction::Previous))
        );
        assert_eq!(
            b.translate(&key("ArrowRight")),
            Some(Command::Step(Direction::Next))
        );
        assert_eq!(b.translate(&key("Enter")), None);
    }

    #[test]
    fn swipe_direction_follows_finger() {
        let mut b = bindings();
        assert_eq!(
            swipe(&mut b, 100.0, 200.0),
            Some(Command::Step(Direction::Previous))
        );
        assert_eq!(
            swipe(&mut b, 300.0, 150.0),
            Some(Command::Step(Direction::Next))
        );
    }

    #[test]
    fn short_swipe_is_ignored() {
        let mut b = bindings();
        assert_eq!(swipe(&mut b, 100.0, 160.0), None);
        assert_eq!(swipe(&mut b, 100.0, 40.0), None);
        assert_eq!(
            swipe(&mut b, 100.0, 161.0),
            Some(Command::Step(Direction::Previous))
        );
    }

    #[test]
    fn threshold_comes_from_config() {
        let mut b = InputBindings::new(&ViewerConfig {
            swipe_threshold: 20.0,
            zoom_scale: 1.8,
        });
        assert_eq!(
            swipe(&mut b, 100.0, 70.0),
            Some(Command::Step(Direction::Next))
        );
    }

    #[test]
    fn touch_end_without_start_is_ignored() {
        let mut b = bindings();
        assert_eq!(b.translate(&InputEvent::TouchEnd { x: Some(500.0) }), None);
        b.translate(&InputEvent::TouchStart { x: None });
        assert_eq!(b.translate(&InputEvent::TouchEnd { x: Some(500.0) }), None);
    }

    #[test]
    fn touch_start_is_consumed_by_end() {
        let mut b = bindings();
        swipe(&mut b, 0.0, 200.0);
        assert_eq!(b.translate(&InputEvent::TouchEnd { x: Some(0.0) }), None);
    }

    #[test]
    fn pointer_down_derives_bounds_from_zoom_scale() {
        let mut b = bindings();
        let command = b.translate(&InputEvent::PointerDown {
            pointer: 3,
            x: 10.0,
            y: 20.0,
            image: Size::new(1000.0, 500.0),
            viewport: Size::new(1200.0, 800.0),
        });
        let Some(Command::DragStart { pointer, at, bounds }) = command else {
            panic!("expected drag start, got {command:?}");
        };
        assert_eq!(pointer, 3);
        assert_eq!(at, Point::new(10.0, 20.0));
        assert!((bounds.max_x - 300.0).abs() < 1e-9);
        assert!((bounds.max_y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn pointer_cancel_ends_drag() {
        let mut b = bindings();
        assert_eq!(
            b.translate(&InputEvent::PointerCancel { pointer: 4 }),
            Some(Command::DragEnd { pointer: 4 })
        );
    }

    #[test]
    fn events_parse_from_json() {
        let event: InputEvent =
            serde_json::from_str(r#"{"event": "touch-start", "x": 12.5}"#).unwrap();
        assert_eq!(event, InputEvent::TouchStart { x: Some(12.5) });

        let event: InputEvent = serde_json::from_str(
            r#"{"event": "pointer-down", "pointer": 1, "x": 0, "y": 0,
                "image": {"width": 800, "height": 600},
                "viewport": {"width": 1024, "height": 768}}"#,
        )
        .unwrap();
        assert!(matches!(event, InputEvent::PointerDown { pointer: 1, .. }));

        let event: InputEvent = serde_json::from_str(r#"{"event": "backdrop-click"}"#).unwrap();
        assert_eq!(event, InputEvent::BackdropClick);
    }
}
