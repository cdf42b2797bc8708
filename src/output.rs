//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is about photos, not files. Each photo leads with its positional
//! index and name; untitled photos show their id in parentheses, because the
//! id is then their only identity. Paths and measurements follow as
//! secondary context.
//!
//! # Output Format
//!
//! ## Layout
//!
//! ```text
//! Width 1200px, gap 14px, target 520px (page 1 of 3)
//! Row 1 (319px)
//!     001 Dawn 510×319
//!     002 (17) 179×319
//!     003 Dusk 478×319
//! Row 2 (520px, trailing)
//!     004 Harbor 780×520
//! ```
//!
//! ## Backfill
//!
//! ```text
//! OK   Dawn 1600×1000
//! SKIP (17) data:image/jpeg;base64,/9j/4AAQ
//! FAIL Dusk /media/dusk.jpg
//!     Unreadable image: ...
//! Backfill: 1 filled, 1 skipped, 1 failed, 12 already sized
//! ```
//!
//! ## Generate
//!
//! ```text
//! Gallery → index.html (14 photos, 1 page)
//! 001 Landscapes → category/3/index.html (9 photos, 1 page)
//! Generated 2 sections, 2 grid pages, 23 photo pages
//! ```
//!
//! ## View
//!
//! ```text
//! [1] mount 1280 → 1280px, page 1/1, 3 rows
//!     viewer: closed
//! [2] click 17
//!     viewer: 17
//! [3] image-click
//!     viewer: 17 zoomed, pan (0, 0)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure, no I/O.

use crate::backfill::{BackfillEvent, BackfillSummary};
use crate::catalog::Catalog;
use crate::config::RowSizing;
use crate::gallery::Pagination;
use crate::generate::GenerateReport;
use crate::layout::Row;
use crate::session::{HostEvent, SessionEvent, Snapshot};
use crate::types::RecordId;
use crate::viewer::{InputEvent, ViewerState};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 Landscapes (5 photos)
/// 001 Landscapes
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "photo")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format a photo line: named photos show the name, unnamed show the id.
///
/// ```text
/// 001 The Sunset        // named
/// 001 (17)              // unnamed, the id IS the identity
/// ```
fn photo_line(index: usize, name: &str, id: &RecordId) -> String {
    if name.trim().is_empty() {
        format!("{} ({})", format_index(index), id)
    } else {
        format!("{} {}", format_index(index), name)
    }
}

/// Photo label without a position, for lines where order is meaningless.
fn photo_label(name: &str, id: &RecordId) -> String {
    if name.trim().is_empty() {
        format!("({})", id)
    } else {
        name.to_string()
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Layout
// ============================================================================

/// Format packed rows for one grid page. Positions count from the start of
/// the whole ordering, not the page.
pub fn format_layout(
    rows: &[Row<'_>],
    width: u32,
    sizing: RowSizing,
    pagination: &Pagination,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Width {}px, gap {}px, target {}px (page {} of {})",
        width,
        sizing.gap,
        sizing.target_row_height,
        pagination.page(),
        pagination.total_pages().max(1)
    )];

    if rows.is_empty() {
        lines.push(format!("{}(no rows)", indent(1)));
        return lines;
    }

    let mut position = pagination.range().start;
    for (row_idx, row) in rows.iter().enumerate() {
        if row.complete {
            lines.push(format!("Row {} ({}px)", row_idx + 1, row.height));
        } else {
            lines.push(format!("Row {} ({}px, trailing)", row_idx + 1, row.height));
        }
        for item in &row.items {
            position += 1;
            lines.push(format!(
                "{}{} {}\u{d7}{}",
                indent(1),
                photo_line(position, &item.photo.name, &item.photo.id),
                item.width,
                item.height
            ));
        }
    }
    lines
}

pub fn print_layout(rows: &[Row<'_>], width: u32, sizing: RowSizing, pagination: &Pagination) {
    for line in format_layout(rows, width, sizing, pagination) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a catalog inventory: categories with photo counts, plus photos
/// that will lay out at the fallback ratio.
pub fn format_check_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec![format!(
        "Photos: {} ({} missing dimensions)",
        catalog.photos.len(),
        catalog.missing_dimensions()
    )];

    if !catalog.categories.is_empty() {
        lines.push(String::new());
        lines.push("Categories".to_string());
        for (i, category) in catalog.categories.iter().enumerate() {
            let count = catalog.photos_in_category(&category.id).len();
            lines.push(entity_header(i + 1, &category.name, Some(count)));
        }
    }

    let uncategorized = catalog
        .photos
        .iter()
        .filter(|p| match &p.category_id {
            None => true,
            Some(id) => catalog.category(id).is_none(),
        })
        .count();
    if uncategorized > 0 {
        lines.push(format!("{}Uncategorized ({})", indent(1), plural(uncategorized, "photo")));
    }

    let missing: Vec<_> = catalog
        .photos
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.has_dimensions())
        .collect();
    if !missing.is_empty() {
        lines.push(String::new());
        lines.push("Missing dimensions (fallback 3:2)".to_string());
        for (i, photo) in missing {
            lines.push(photo_line(i + 1, &photo.name, &photo.id));
            lines.push(format!("{}Source: {}", indent(1), photo.url));
        }
    }
    lines
}

pub fn print_check_output(catalog: &Catalog) {
    for line in format_check_output(catalog) {
        println!("{}", line);
    }
}

// ============================================================================
// Backfill
// ============================================================================

/// Format a single backfill progress event as display lines.
pub fn format_backfill_event(event: &BackfillEvent) -> Vec<String> {
    match event {
        BackfillEvent::Filled {
            id,
            name,
            width,
            height,
        } => vec![format!(
            "OK   {} {}\u{d7}{}",
            photo_label(name, id),
            width,
            height
        )],
        BackfillEvent::Skipped { id, name, url } => {
            vec![format!("SKIP {} {}", photo_label(name, id), url)]
        }
        BackfillEvent::Failed {
            id,
            name,
            url,
            error,
        } => vec![
            format!("FAIL {} {}", photo_label(name, id), url),
            format!("{}{}", indent(1), error),
        ],
    }
}

pub fn format_backfill_summary(summary: &BackfillSummary) -> String {
    format!(
        "Backfill: {} filled, {} skipped, {} failed, {} already sized",
        summary.filled, summary.skipped, summary.failed, summary.sized
    )
}

// ============================================================================
// Generate
// ============================================================================

/// Format generate output: one line per section, then totals.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, section) in report.sections.iter().enumerate() {
        let detail = format!(
            "({}, {})",
            plural(section.photo_count, "photo"),
            plural(section.grid_pages, "page")
        );
        if i == 0 {
            lines.push(format!(
                "{} \u{2192} {} {}",
                section.title, section.index_path, detail
            ));
        } else {
            lines.push(format!(
                "{} \u{2192} {} {}",
                entity_header(i, &section.title, None),
                section.index_path,
                detail
            ));
        }
    }
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(report.sections.len(), "section"),
        plural(report.grid_pages(), "grid page"),
        plural(report.photo_pages(), "photo page")
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// View
// ============================================================================

/// Short description of a session event.
fn describe_event(event: &SessionEvent) -> String {
    fn width(w: &Option<f64>) -> String {
        w.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string())
    }
    match event {
        SessionEvent::Host(host) => match host {
            HostEvent::Mount { width: w } => format!("mount {}", width(w)),
            HostEvent::Resize { width: w } => format!("resize {}", width(w)),
            HostEvent::Unmount => "unmount".to_string(),
            HostEvent::Page { page } => format!("page {page}"),
            HostEvent::Click { photo } => format!("click {photo}"),
            HostEvent::DeepLink { photo } => format!("deep-link {photo}"),
        },
        SessionEvent::Input(input) => match input {
            InputEvent::Key { key } => format!("key {key}"),
            InputEvent::TouchStart { x } => format!("touch-start {}", width(x)),
            InputEvent::TouchEnd { x } => format!("touch-end {}", width(x)),
            InputEvent::ImageClick => "image-click".to_string(),
            InputEvent::BackdropClick => "backdrop-click".to_string(),
            InputEvent::Prev => "prev".to_string(),
            InputEvent::Next => "next".to_string(),
            InputEvent::Close => "close".to_string(),
            InputEvent::PointerDown { pointer, x, y, .. } => {
                format!("pointer-down #{pointer} ({x}, {y})")
            }
            InputEvent::PointerMove { pointer, x, y } => {
                format!("pointer-move #{pointer} ({x}, {y})")
            }
            InputEvent::PointerUp { pointer } => format!("pointer-up #{pointer}"),
            InputEvent::PointerCancel { pointer } => format!("pointer-cancel #{pointer}"),
        },
    }
}

/// One-line viewer state.
pub fn format_viewer_state(state: &ViewerState) -> String {
    match state {
        ViewerState::Closed => "closed".to_string(),
        ViewerState::Open(view) if view.zoomed => {
            let drag = if view.drag.is_some() { ", dragging" } else { "" };
            format!(
                "{} zoomed, pan ({}, {}){}",
                view.active, view.pan.x, view.pan.y, drag
            )
        }
        ViewerState::Open(view) => view.active.to_string(),
    }
}

/// Format one session step.
///
/// Grid details are shown only when the grid is what changed (mount,
/// resize, page), so viewer-only steps stay to two lines.
pub fn format_snapshot(snapshot: &Snapshot) -> Vec<String> {
    let mut header = format!("[{}] {}", snapshot.line, describe_event(&snapshot.event));
    let grid_event = matches!(
        snapshot.event,
        SessionEvent::Host(
            HostEvent::Mount { .. } | HostEvent::Resize { .. } | HostEvent::Page { .. }
        )
    );
    if grid_event {
        header.push_str(&format!(
            " \u{2192} {}px, page {}/{}, {}",
            snapshot.width,
            snapshot.page,
            snapshot.total_pages.max(1),
            plural(snapshot.rows.len(), "row")
        ));
    }
    if !snapshot.changed {
        header.push_str(" (no change)");
    }
    vec![
        header,
        format!("{}viewer: {}", indent(1), format_viewer_state(&snapshot.viewer)),
    ]
}

pub fn print_snapshots(snapshots: &[Snapshot]) {
    for snapshot in snapshots {
        for line in format_snapshot(snapshot) {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::SectionReport;
    use crate::layout;
    use crate::types::{Category, Photo};
    use crate::viewer::{OpenView, Point};

    fn photo(id: u64, name: &str, size: Option<(u32, u32)>) -> Photo {
        Photo {
            id: id.into(),
            name: name.into(),
            url: format!("/media/{id}.jpg"),
            width: size.map(|s| s.0),
            height: size.map(|s| s.1),
            category_id: None,
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn entity_header_with_count() {
        assert_eq!(
            entity_header(1, "Landscapes", Some(5)),
            "001 Landscapes (5 photos)"
        );
        assert_eq!(entity_header(2, "Street", Some(1)), "002 Street (1 photo)");
        assert_eq!(entity_header(3, "Street", None), "003 Street");
    }

    #[test]
    fn photo_line_falls_back_to_id() {
        assert_eq!(photo_line(1, "Sunset", &7.into()), "001 Sunset");
        assert_eq!(photo_line(2, "  ", &"abc".into()), "002 (abc)");
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[test]
    fn layout_lists_rows_and_sizes() {
        let photos = vec![
            photo(1, "Dawn", Some((1600, 1000))),
            photo(2, "", Some((900, 1600))),
            photo(3, "Dusk", Some((1200, 800))),
            photo(4, "Harbor", Some((1500, 1000))),
        ];
        let rows = layout::pack(&photos, 1200, 500, 14);
        let sizing = RowSizing {
            gap: 14,
            target_row_height: 500,
        };
        let lines = format_layout(&rows, 1200, sizing, &Pagination::new(4, 30));
        assert_eq!(
            lines,
            vec![
                "Width 1200px, gap 14px, target 500px (page 1 of 1)",
                "Row 1 (319px)",
                "    001 Dawn 510\u{d7}319",
                "    002 (2) 179\u{d7}319",
                "    003 Dusk 478\u{d7}319",
                "Row 2 (500px, trailing)",
                "    004 Harbor 750\u{d7}500",
            ]
        );
    }

    #[test]
    fn layout_positions_continue_across_pages() {
        let photos: Vec<Photo> = (1..=6).map(|i| photo(i, "", Some((1000, 1000)))).collect();
        let mut pagination = Pagination::new(6, 3);
        pagination.set_page(2);
        let rows = layout::pack(&photos[3..], 5000, 300, 10);
        let sizing = RowSizing {
            gap: 10,
            target_row_height: 300,
        };
        let lines = format_layout(&rows, 5000, sizing, &pagination);
        assert!(lines[2].starts_with("    004 (4)"));
    }

    #[test]
    fn layout_without_width_says_so() {
        let sizing = RowSizing {
            gap: 10,
            target_row_height: 360,
        };
        let lines = format_layout(&[], 0, sizing, &Pagination::new(0, 30));
        assert_eq!(lines[1], "    (no rows)");
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn check_lists_categories_and_missing() {
        let mut a = photo(1, "Dawn", Some((10, 10)));
        a.category_id = Some(5.into());
        let b = photo(2, "", None);
        let catalog = Catalog {
            photos: vec![a, b],
            categories: vec![Category {
                id: 5.into(),
                name: "Landscapes".into(),
            }],
        };
        let lines = format_check_output(&catalog);
        assert_eq!(lines[0], "Photos: 2 (1 missing dimensions)");
        assert!(lines.contains(&"001 Landscapes (1 photo)".to_string()));
        assert!(lines.contains(&"    Uncategorized (1 photo)".to_string()));
        assert!(lines.contains(&"002 (2)".to_string()));
        assert!(lines.contains(&"    Source: /media/2.jpg".to_string()));
    }

    // =========================================================================
    // Backfill
    // =========================================================================

    #[test]
    fn backfill_event_lines() {
        let filled = BackfillEvent::Filled {
            id: 1.into(),
            name: "Dawn".into(),
            width: 1600,
            height: 1000,
        };
        assert_eq!(format_backfill_event(&filled), vec!["OK   Dawn 1600\u{d7}1000"]);

        let failed = BackfillEvent::Failed {
            id: 2.into(),
            name: String::new(),
            url: "/b.jpg".into(),
            error: "boom".into(),
        };
        assert_eq!(
            format_backfill_event(&failed),
            vec!["FAIL (2) /b.jpg", "    boom"]
        );
    }

    #[test]
    fn backfill_summary_line() {
        let summary = BackfillSummary {
            sized: 12,
            filled: 1,
            skipped: 1,
            failed: 1,
        };
        assert_eq!(
            format_backfill_summary(&summary),
            "Backfill: 1 filled, 1 skipped, 1 failed, 12 already sized"
        );
    }

    // =========================================================================
    // Generate
    // =========================================================================

    #[test]
    fn generate_output_lines() {
        let report = GenerateReport {
            sections: vec![
                SectionReport {
                    title: "Gallery".into(),
                    index_path: "index.html".into(),
                    photo_count: 14,
                    grid_pages: 1,
                    photo_pages: 14,
                },
                SectionReport {
                    title: "Landscapes".into(),
                    index_path: "category/3/index.html".into(),
                    photo_count: 9,
                    grid_pages: 1,
                    photo_pages: 9,
                },
            ],
        };
        assert_eq!(
            format_generate_output(&report),
            vec![
                "Gallery \u{2192} index.html (14 photos, 1 page)",
                "001 Landscapes \u{2192} category/3/index.html (9 photos, 1 page)",
                "Generated 2 sections, 2 grid pages, 23 photo pages",
            ]
        );
    }

    // =========================================================================
    // View
    // =========================================================================

    #[test]
    fn viewer_state_lines() {
        assert_eq!(format_viewer_state(&ViewerState::Closed), "closed");
        let open = OpenView {
            active: 17.into(),
            zoomed: false,
            pan: Point::ORIGIN,
            drag: None,
        };
        assert_eq!(format_viewer_state(&ViewerState::Open(open.clone())), "17");
        let zoomed = OpenView {
            zoomed: true,
            pan: Point::new(-40.0, 12.5),
            ..open
        };
        assert_eq!(
            format_viewer_state(&ViewerState::Open(zoomed)),
            "17 zoomed, pan (-40, 12.5)"
        );
    }

    #[test]
    fn snapshot_shows_grid_only_for_grid_events() {
        let mount = Snapshot {
            line: 1,
            event: SessionEvent::Host(HostEvent::Mount {
                width: Some(1280.0),
            }),
            changed: true,
            width: 1280,
            page: 1,
            total_pages: 1,
            rows: vec![(400, 3), (520, 1)],
            viewer: ViewerState::Closed,
        };
        assert_eq!(
            format_snapshot(&mount),
            vec![
                "[1] mount 1280 \u{2192} 1280px, page 1/1, 2 rows",
                "    viewer: closed"
            ]
        );

        let key = Snapshot {
            line: 2,
            event: SessionEvent::Input(InputEvent::Key {
                key: "ArrowLeft".into(),
            }),
            changed: false,
            ..mount
        };
        assert_eq!(format_snapshot(&key)[0], "[2] key ArrowLeft (no change)");
    }
}
