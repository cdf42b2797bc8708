//! Justified row packing.
//!
//! Pure, stateless, no I/O: the same photos at the same width always produce
//! the same rows, so the gallery recomputes freely on every resize or page
//! change.
//!
//! Photos are consumed greedily left to right. After each photo the row's
//! width at the target height is estimated as
//! `sum(ratios) * target_row_height + gap * (count - 1)`. Once that reaches
//! the container width the row is closed and its real height solved from the
//! usable width:
//!
//! ```text
//! usable     = container_width - ROUNDING_SLACK - gap * (count - 1)
//! row_height = max(MIN_ROW_HEIGHT, floor(usable / sum(ratios)))
//! width_i    = floor(ratio_i * row_height)
//! ```
//!
//! A trailing row that never reached the threshold is emitted at the target
//! height. Stretching it to the full width would blow a lone photo up to an
//! absurd size.
//!
//! The floor applies to that row too: a target below [`MIN_ROW_HEIGHT`] is
//! raised to it, so no row of any kind is ever shorter than 240px. With the
//! stock breakpoints (360px and up) this never triggers.

use crate::types::Photo;

/// Hard floor for the height of any row.
pub const MIN_ROW_HEIGHT: u32 = 240;

/// Pixels withheld from the usable width so floored widths never overflow.
const ROUNDING_SLACK: f64 = 2.0;

/// A photo placed in a row, with its computed render box.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem<'a> {
    pub photo: &'a Photo,
    pub aspect_ratio: f64,
    pub width: u32,
    pub height: u32,
}

/// One justified row. Every item shares `height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub height: u32,
    pub items: Vec<RenderItem<'a>>,
    /// `false` for the trailing row that was left at the target height.
    pub complete: bool,
}

impl Row<'_> {
    /// Rendered width of the row including the gaps between items.
    pub fn span(&self, gap: u32) -> u32 {
        let widths: u32 = self.items.iter().map(|item| item.width).sum();
        widths + gap * self.items.len().saturating_sub(1) as u32
    }
}

/// Pack photos into justified rows.
///
/// Returns no rows when `container_width` is zero (the container has not
/// been measured yet). Rows partition `photos` in their original order.
pub fn pack(
    photos: &[Photo],
    container_width: u32,
    target_row_height: u32,
    gap: u32,
) -> Vec<Row<'_>> {
    if container_width == 0 {
        return Vec::new();
    }

    let container = container_width as f64;
    let target = target_row_height as f64;
    let gap_px = gap as f64;

    let mut rows = Vec::new();
    let mut current: Vec<(&Photo, f64)> = Vec::new();
    let mut sum_ratios = 0.0;

    for photo in photos {
        let ratio = photo.aspect_ratio();
        current.push((photo, ratio));
        sum_ratios += ratio;

        let gaps = gap_px * (current.len() - 1) as f64;
        if sum_ratios * target + gaps >= container {
            let usable = container - ROUNDING_SLACK - gaps;
            let row_height = (usable / sum_ratios).floor().max(MIN_ROW_HEIGHT as f64) as u32;
            rows.push(close_row(&current, row_height, true));
            current.clear();
            sum_ratios = 0.0;
        }
    }

    if !current.is_empty() {
        rows.push(close_row(&current, target_row_height.max(MIN_ROW_HEIGHT), false));
    }

    rows
}

fn close_row<'a>(items: &[(&'a Photo, f64)], height: u32, complete: bool) -> Row<'a> {
    Row {
        height,
        items: items
            .iter()
            .map(|&(photo, ratio)| RenderItem {
                photo,
                aspect_ratio: ratio,
                width: (ratio * height as f64).floor() as u32,
                height,
            })
            .collect(),
        complete,
    }
}
