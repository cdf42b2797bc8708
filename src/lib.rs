//! # Justified Gal
//!
//! A photo gallery engine: justified rows, a paginated grid, and a full-screen
//! lightbox with zoom, pan, swipe and keyboard navigation. Photos come from an
//! external catalog (JSON); the engine never persists anything itself.
//!
//! # Architecture: Pure Core, Thin Hosts
//!
//! ```text
//! catalog.json ─▶ Catalog ─▶ Gallery ─┬─▶ layout::pack ─▶ rows ─▶ HTML / CLI
//!                                    │
//!          WidthObserver ────────────┘
//!                                    ┌─▶ viewer::transition ─▶ effects
//!          clicks, keys, touches ─▶ Lightbox ──▶ Preload ─▶ ImageFetcher
//! ```
//!
//! The core (`layout`, `viewer::state`, `gallery`) is pure: same inputs, same
//! rows, same state. Everything with side effects sits behind a trait seam
//! ([`preload::Preload`], [`preload::ImageFetcher`],
//! [`backfill::DimensionProbe`]) so tests substitute recording fakes.
//!
//! Hosts compose the core:
//!
//! - [`page::GalleryPage`] wires observer, grid and lightbox the way an
//!   interactive page does, including deep links.
//! - [`generate`] renders the same rows and viewer links to static HTML.
//! - [`session`] replays scripted input through a `GalleryPage`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`layout`] | Justified row packing: `pack(photos, width, target, gap) → rows` |
//! | [`gallery`] | Paginated grid over one ordering, breakpoint sizing, row HTML |
//! | [`viewer`] | Lightbox state machine, input bindings, effect dispatcher |
//! | [`preload`] | Idempotent preload cache and the decoding fetcher |
//! | [`width`] | Container width signal (floored, change-only) |
//! | [`page`] | Gallery page host: observer + grid + lightbox, deep links |
//! | [`catalog`] | Photo/category records, id and dimension normalization |
//! | [`media`] | Photo URL → file under the media root |
//! | [`backfill`] | Probe local files for missing photo dimensions |
//! | [`generate`] | Static site rendering with Maud |
//! | [`session`] | JSON-lines session replay |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`types`] | Shared records: `Photo`, `Category`, `RecordId` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Trailing Rows Keep the Target Height
//!
//! A row closes once its photos at the target height would fill the
//! container; its real height is then solved so it fits exactly. The last row
//! usually never gets there. It stays at the target height instead of being
//! stretched, so a lone final photo does not balloon to full width.
//!
//! ## Navigation Ignores Pagination
//!
//! The grid shows one page; the lightbox navigates the whole ordering. Stepping
//! past the last photo of a page simply shows the next one. Deep links move the
//! grid to the page that holds the linked photo.
//!
//! ## Transitions Return Effects
//!
//! [`viewer::transition`] never touches the preload cache. It returns the URLs
//! to warm and the id to report, and [`viewer::Lightbox`] carries them out.
//! Every viewer rule is therefore a plain function test.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error and all interpolation is
//! auto-escaped, which matters since photo names come from an external service.

pub mod backfill;
pub mod catalog;
pub mod config;
pub mod gallery;
pub mod generate;
pub mod layout;
pub mod media;
pub mod output;
pub mod page;
pub mod preload;
pub mod session;
pub mod types;
pub mod viewer;
pub mod width;

#[cfg(test)]
pub(crate) mod test_helpers;
