//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top of it key by
//! key, and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! snapshot_width = 1280     # Container width assumed for static pages
//!
//! [[layout.breakpoints]]
//! min_width = 0             # Applies from this container width upwards
//! gap = 10                  # Spacing between photos, px
//! target_row_height = 360   # Preferred row height, px
//!
//! [[layout.breakpoints]]
//! min_width = 640
//! gap = 14
//! target_row_height = 440
//!
//! [[layout.breakpoints]]
//! min_width = 1024
//! gap = 14
//! target_row_height = 520
//!
//! [pagination]
//! page_size = 30            # Photos per grid page
//!
//! [viewer]
//! swipe_threshold = 60.0    # Horizontal travel (px) that counts as a swipe
//! zoom_scale = 1.8          # Magnification when zoomed in
//!
//! [preload]
//! warm_current_page = true  # Preload every photo on the visible grid page
//! max_threads = 2           # Decode workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse, override just the values you want:
//!
//! ```toml
//! [pagination]
//! page_size = 9
//! ```
//!
//! Arrays (the breakpoint table) are replaced wholesale, not merged.
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Row packing settings (breakpoint table, snapshot width).
    pub layout: LayoutConfig,
    /// Grid pagination.
    pub pagination: PaginationConfig,
    /// Lightbox gesture tuning.
    pub viewer: ViewerConfig,
    /// Image preloading.
    pub preload: PreloadConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.snapshot_width == 0 {
            return Err(ConfigError::Validation(
                "layout.snapshot_width must be positive".into(),
            ));
        }
        self.layout.breakpoints.validate()?;
        if self.pagination.page_size == 0 {
            return Err(ConfigError::Validation(
                "pagination.page_size must be at least 1".into(),
            ));
        }
        if !(self.viewer.swipe_threshold.is_finite() && self.viewer.swipe_threshold > 0.0) {
            return Err(ConfigError::Validation(
                "viewer.swipe_threshold must be a positive number".into(),
            ));
        }
        if !(self.viewer.zoom_scale.is_finite() && self.viewer.zoom_scale >= 1.0) {
            return Err(ConfigError::Validation(
                "viewer.zoom_scale must be at least 1.0".into(),
            ));
        }
        if self.preload.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "preload.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Row packing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Container width assumed when rendering static pages.
    pub snapshot_width: u32,
    /// Responsive gap/target-height table keyed by container width.
    pub breakpoints: Breakpoints,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            snapshot_width: 1280,
            breakpoints: Breakpoints::default(),
        }
    }
}

/// One row of the responsive table: applies to containers at least
/// `min_width` wide, until the next breakpoint takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub min_width: u32,
    pub gap: u32,
    pub target_row_height: u32,
}

/// Packing parameters chosen for a particular container width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSizing {
    pub gap: u32,
    pub target_row_height: u32,
}

/// Breakpoint table, ordered by `min_width`.
///
/// Validation guarantees it starts at width 0 and that a wider container
/// never gets a shorter target row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breakpoints(pub Vec<Breakpoint>);

impl Default for Breakpoints {
    fn default() -> Self {
        Self(vec![
            Breakpoint {
                min_width: 0,
                gap: 10,
                target_row_height: 360,
            },
            Breakpoint {
                min_width: 640,
                gap: 14,
                target_row_height: 440,
            },
            Breakpoint {
                min_width: 1024,
                gap: 14,
                target_row_height: 520,
            },
        ])
    }
}

impl Breakpoints {
    /// Gap and target row height for a container width.
    pub fn sizing_for(&self, width: u32) -> RowSizing {
        let bp = self
            .0
            .iter()
            .rev()
            .find(|bp| bp.min_width <= width)
            .or_else(|| self.0.first());
        match bp {
            Some(bp) => RowSizing {
                gap: bp.gap,
                target_row_height: bp.target_row_height,
            },
            None => {
                let fallback = Breakpoints::default().0[0];
                RowSizing {
                    gap: fallback.gap,
                    target_row_height: fallback.target_row_height,
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Some(first) = self.0.first() else {
            return Err(ConfigError::Validation(
                "layout.breakpoints must not be empty".into(),
            ));
        };
        if first.min_width != 0 {
            return Err(ConfigError::Validation(
                "layout.breakpoints must start at min_width = 0".into(),
            ));
        }
        if self.0.iter().any(|bp| bp.target_row_height == 0) {
            return Err(ConfigError::Validation(
                "layout.breakpoints target_row_height must be positive".into(),
            ));
        }
        for pair in self.0.windows(2) {
            if pair[1].min_width <= pair[0].min_width {
                return Err(ConfigError::Validation(
                    "layout.breakpoints must be sorted by strictly increasing min_width".into(),
                ));
            }
            if pair[1].target_row_height < pair[0].target_row_height {
                return Err(ConfigError::Validation(format!(
                    "layout.breakpoints: target_row_height shrinks at min_width = {}",
                    pair[1].min_width
                )));
            }
        }
        Ok(())
    }
}

/// Grid pagination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Photos per grid page.
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 30 }
    }
}

/// Lightbox gesture tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Minimum horizontal finger travel (px) recognized as a swipe.
    pub swipe_threshold: f64,
    /// Magnification applied when the photo is zoomed in.
    pub zoom_scale: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 60.0,
            zoom_scale: 1.8,
        }
    }
}

/// Image preloading settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreloadConfig {
    /// Preload every photo on the visible grid page, not only the
    /// lightbox neighbourhood.
    pub warm_current_page: bool,
    /// Maximum number of decode workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            warm_current_page: true,
            max_threads: None,
        }
    }
}

/// Resolve the effective decode worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &PreloadConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (including arrays) replace base values.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory on top of the
/// stock defaults.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Justified Gallery Configuration
# ===============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Container width (px) assumed when rendering static gallery pages.
snapshot_width = 1280

# Responsive row sizing. Each entry applies from `min_width` upwards until
# the next one. Must start at 0, with strictly increasing min_width, and a
# wider container may never get a shorter target row.
# Overriding this table replaces it entirely.
[[layout.breakpoints]]
min_width = 0
gap = 10
target_row_height = 360

[[layout.breakpoints]]
min_width = 640
gap = 14
target_row_height = 440

[[layout.breakpoints]]
min_width = 1024
gap = 14
target_row_height = 520

# ---------------------------------------------------------------------------
# Pagination
# ---------------------------------------------------------------------------
[pagination]
# Photos per grid page. The lightbox still navigates across page breaks.
page_size = 30

# ---------------------------------------------------------------------------
# Viewer
# ---------------------------------------------------------------------------
[viewer]
# Horizontal finger travel (px) that counts as a swipe to the next/previous photo.
swipe_threshold = 60.0

# Magnification when a photo is clicked to zoom. Also bounds how far it can be dragged.
zoom_scale = 1.8

# ---------------------------------------------------------------------------
# Preloading
# ---------------------------------------------------------------------------
[preload]
# Preload every photo on the visible grid page, not just the lightbox neighbours.
warm_current_page = true

# Maximum decode workers. Omit to use one per CPU core.
# max_threads = 2
"##
}
