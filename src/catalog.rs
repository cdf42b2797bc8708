//! Catalog boundary: the photo and category records supplied by the data
//! service.
//!
//! The catalog is a single JSON document:
//!
//! ```json
//! {
//!   "photos": [
//!     {"id": 12, "name": "Dusk", "url": "/media/dusk.jpg",
//!      "width": 1600, "height": 1000, "category_id": 3}
//!   ],
//!   "categories": [{"id": 3, "name": "Landscapes"}]
//! }
//! ```
//!
//! Photo order is preserved exactly as supplied (newest first upstream).
//! Dimensions are validated here, once: integers, floats and numeric strings
//! are accepted, anything non-positive or unparseable becomes `None` so the
//! layout engine falls back to the default aspect ratio for that photo.

use crate::types::{Category, CategoryId, Photo, PhotoId, RecordId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Photos and categories as handed over by the data service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub photos: Vec<Photo>,
    pub categories: Vec<Category>,
}

#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    photos: Vec<PhotoRecord>,
    #[serde(default)]
    categories: Vec<Category>,
}

/// A photo as it arrives on the wire, before dimension validation.
#[derive(Deserialize)]
struct PhotoRecord {
    id: RecordId,
    #[serde(default, alias = "nombre")]
    name: Option<String>,
    url: String,
    #[serde(default)]
    width: Option<RawDimension>,
    #[serde(default)]
    height: Option<RawDimension>,
    #[serde(default, alias = "categoryId", alias = "categoria_id")]
    category_id: Option<RecordId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDimension {
    Int(i64),
    Float(f64),
    Text(String),
    /// Booleans, objects, arrays: read as missing rather than failing the load.
    Other(serde::de::IgnoredAny),
}

impl RawDimension {
    /// Positive pixel count, or `None` for anything the layout can't trust.
    fn to_pixels(&self) -> Option<u32> {
        let value = match self {
            RawDimension::Int(n) => *n as f64,
            RawDimension::Float(f) => *f,
            RawDimension::Text(s) => s.trim().parse::<f64>().ok()?,
            RawDimension::Other(_) => return None,
        };
        if value.is_finite() && value >= 1.0 && value <= u32::MAX as f64 {
            Some(value as u32)
        } else {
            None
        }
    }
}

impl From<PhotoRecord> for Photo {
    fn from(record: PhotoRecord) -> Self {
        Photo {
            id: record.id,
            name: record.name.unwrap_or_default(),
            url: record.url,
            width: record.width.as_ref().and_then(RawDimension::to_pixels),
            height: record.height.as_ref().and_then(RawDimension::to_pixels),
            category_id: record.category_id,
        }
    }
}

impl Catalog {
    /// Parse a catalog document, normalizing ids and dimensions.
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(content)?;
        let mut categories = raw.categories;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self {
            photos: raw.photos.into_iter().map(Photo::from).collect(),
            categories,
        })
    }

    /// Photos belonging to a category, in catalog order.
    pub fn photos_in_category(&self, category: &CategoryId) -> Vec<Photo> {
        self.photos
            .iter()
            .filter(|p| p.category_id.as_ref() == Some(category))
            .cloned()
            .collect()
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    pub fn photo(&self, id: &PhotoId) -> Option<&Photo> {
        self.photos.iter().find(|p| &p.id == id)
    }

    /// Number of photos whose dimensions are missing or invalid.
    pub fn missing_dimensions(&self) -> usize {
        self.photos.iter().filter(|p| !p.has_dimensions()).count()
    }
}

/// Load a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let content = fs::read_to_string(path)?;
    Catalog::from_json(&content)
}

/// Write a catalog back to disk as pretty-printed JSON.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "photos": [
            {"id": 1, "name": "Dawn", "url": "/m/dawn.jpg", "width": 1600, "height": 1000, "category_id": 2},
            {"id": "2", "url": "/m/tall.jpg", "width": "900", "height": 1600.0, "categoryId": 1},
            {"id": 3, "nombre": "Legacy", "url": "/m/old.jpg", "width": 0, "height": -4},
            {"id": 4, "url": "/m/junk.jpg", "width": "wide", "height": null}
        ],
        "categories": [
            {"id": 2, "name": "Retratos"},
            {"id": 1, "name": "Naturaleza"}
        ]
    }"#;

    #[test]
    fn parses_photos_in_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let ids: Vec<&str> = catalog.photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn normalizes_dimensions() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.photos[0].width, Some(1600));
        assert_eq!(catalog.photos[1].width, Some(900));
        assert_eq!(catalog.photos[1].height, Some(1600));
        assert_eq!(catalog.photos[2].width, None);
        assert_eq!(catalog.photos[2].height, None);
        assert_eq!(catalog.photos[3].width, None);
        assert_eq!(catalog.missing_dimensions(), 2);
    }

    #[test]
    fn non_numeric_dimension_types_read_as_missing() {
        let catalog = Catalog::from_json(
            r#"{"photos": [
                {"id": 1, "url": "/a.jpg", "width": true, "height": 800},
                {"id": 2, "url": "/b.jpg", "width": {"px": 1200}, "height": [800]},
                {"id": 3, "url": "/c.jpg", "width": 1200, "height": 800}
            ]}"#,
        )
        .unwrap();
        assert_eq!(catalog.photos.len(), 3);
        assert_eq!(catalog.photos[0].width, None);
        assert_eq!(catalog.photos[0].height, Some(800));
        assert_eq!(catalog.photos[0].aspect_ratio(), crate::types::FALLBACK_ASPECT_RATIO);
        assert_eq!((catalog.photos[1].width, catalog.photos[1].height), (None, None));
        assert_eq!(catalog.photos[2].width, Some(1200));
    }

    #[test]
    fn accepts_legacy_field_names() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.photos[2].name, "Legacy");
        assert_eq!(catalog.photos[1].category_id, Some(RecordId::from("1")));
    }

    #[test]
    fn categories_sorted_by_name() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let names: Vec<&str> = catalog.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Naturaleza", "Retratos"]);
    }

    #[test]
    fn photos_in_category_filters_and_keeps_order() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        let photos = catalog.photos_in_category(&RecordId::from("2"));
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].name, "Dawn");
        assert!(catalog.photos_in_category(&RecordId::from("99")).is_empty());
    }

    #[test]
    fn empty_document_is_empty_catalog() {
        let catalog = Catalog::from_json("{}").unwrap();
        assert!(catalog.photos.is_empty());
        assert!(catalog.categories.is_empty());
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(matches!(
            Catalog::from_json("not json"),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn save_and_reload_preserves_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        let catalog = Catalog::from_json(SAMPLE).unwrap();
        save_catalog(&catalog, &path).unwrap();
        let reloaded = load_catalog(&path).unwrap();
        assert_eq!(reloaded, catalog);
    }
}
