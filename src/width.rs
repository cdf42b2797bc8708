//! Container width signal.
//!
//! The host reports raw measurements of the gallery element (fractional CSS
//! pixels, or nothing when the element is gone). The observer floors them to
//! whole pixels and only emits when the floored width actually changes, so
//! downstream layout recomputes once per real change.

/// Tracks the rendered width of the gallery's host element.
///
/// Starts detached at width 0, which the packing engine treats as "not laid
/// out yet".
#[derive(Debug, Clone, Default)]
pub struct WidthObserver {
    width: u32,
    attached: bool,
}

impl WidthObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing a mounted host element, taking its first measurement.
    pub fn attach(&mut self, measured: Option<f64>) -> Option<u32> {
        self.attached = true;
        self.observe(measured)
    }

    /// Stop observing. The last known width is kept.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Last emitted width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Feed a size notification.
    ///
    /// Returns the new width when it changed. Notifications while detached,
    /// or without a measurement (element absent), leave the width untouched.
    pub fn observe(&mut self, measured: Option<f64>) -> Option<u32> {
        if !self.attached {
            return None;
        }
        let next = floor_width(measured?);
        if next == self.width {
            return None;
        }
        tracing::debug!(from = self.width, to = next, "container width changed");
        self.width = next;
        Some(next)
    }
}

fn floor_width(measured: f64) -> u32 {
    if measured.is_finite() && measured > 0.0 {
        measured.floor().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
