//! Place photo records, requests and resolution results

use crate::source::PhotoSource;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Width requested when the caller does not pass one.
pub const DEFAULT_MAX_WIDTH: u32 = 800;

/// Largest width the photo API serves.
pub const MAX_PHOTO_WIDTH: u32 = 1600;

/// Clamp a requested width into `1..=MAX_PHOTO_WIDTH`.
pub fn clamp_max_width(max_width: u32) -> u32 {
    max_width.clamp(1, MAX_PHOTO_WIDTH)
}

/// Normalize a place name into its natural key.
///
/// Trims both ends and collapses runs of inner whitespace to a single space.
/// Case is preserved.
pub fn normalize_place_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A request to resolve a photo for one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoRequest {
    /// Normalized place name (never empty)
    pub place_name: String,
    /// Maximum photo width in pixels
    pub max_width: u32,
    /// Optional category hint (e.g. "Pantai", "Gunung")
    pub category: Option<String>,
}

impl PhotoRequest {
    /// Create a request, rejecting names that are empty after trimming
    pub fn new(place_name: &str) -> Result<Self> {
        let place_name = normalize_place_name(place_name);
        if place_name.is_empty() {
            return Err(Error::EmptyPlaceName);
        }

        Ok(Self {
            place_name,
            max_width: DEFAULT_MAX_WIDTH,
            category: None,
        })
    }

    /// Set the maximum width, clamped to what the photo API serves
    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = clamp_max_width(max_width);
        self
    }

    /// Set the category hint; blank hints count as absent
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        let category = category.trim();
        self.category = if category.is_empty() {
            None
        } else {
            Some(category.to_string())
        };
        self
    }
}

/// One row of the photo cache, keyed by normalized place name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePhotoRecord {
    pub place_name: String,
    pub image_url: String,
    /// Opaque third-party place identifier
    pub place_id: Option<String>,
    /// Provenance tag, informational only
    pub source: PhotoSource,
    pub attribution: Option<String>,
    pub cached_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlacePhotoRecord {
    /// Create a record stamped with the current time
    pub fn new(place_name: &str, image_url: impl Into<String>, source: PhotoSource) -> Self {
        let now = Utc::now();
        Self {
            place_name: normalize_place_name(place_name),
            image_url: image_url.into(),
            place_id: None,
            source,
            attribution: None,
            cached_at: now,
            updated_at: now,
        }
    }

    pub fn with_place_id(mut self, place_id: Option<String>) -> Self {
        self.place_id = place_id;
        self
    }

    pub fn with_attribution(mut self, attribution: Option<String>) -> Self {
        self.attribution = attribution;
        self
    }
}

/// Outcome of a resolution, returned to the caller and never persisted.
///
/// `image_url` is always set: the category tier cannot miss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    pub image_url: String,
    pub source: PhotoSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl ResolutionResult {
    pub fn new(image_url: impl Into<String>, source: PhotoSource) -> Self {
        Self {
            image_url: image_url.into(),
            source,
            place_id: None,
            attribution: None,
        }
    }
}

impl From<&PlacePhotoRecord> for ResolutionResult {
    fn from(record: &PlacePhotoRecord) -> Self {
        Self {
            image_url: record.image_url.clone(),
            source: PhotoSource::Cache,
            place_id: record.place_id.clone(),
            attribution: record.attribution.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_place_name("  Raja   Ampat \t"), "Raja Ampat");
        assert_eq!(normalize_place_name("Ubud"), "Ubud");
        assert_eq!(normalize_place_name("   "), "");
    }

    #[test]
    fn test_request_rejects_blank_name() {
        assert!(matches!(PhotoRequest::new("  \n "), Err(Error::EmptyPlaceName)));
    }

    #[test]
    fn test_request_defaults() {
        let request = PhotoRequest::new(" Borobudur ").unwrap();
        assert_eq!(request.place_name, "Borobudur");
        assert_eq!(request.max_width, DEFAULT_MAX_WIDTH);
        assert!(request.category.is_none());
    }

    #[test]
    fn test_max_width_is_clamped() {
        let request = PhotoRequest::new("Kuta").unwrap();
        assert_eq!(request.clone().with_max_width(0).max_width, 1);
        assert_eq!(request.clone().with_max_width(5000).max_width, MAX_PHOTO_WIDTH);
        assert_eq!(request.with_max_width(640).max_width, 640);
    }

    #[test]
    fn test_blank_category_is_absent() {
        let request = PhotoRequest::new("Kuta").unwrap().with_category("  ");
        assert!(request.category.is_none());

        let request = PhotoRequest::new("Kuta").unwrap().with_category(" Pantai ");
        assert_eq!(request.category.as_deref(), Some("Pantai"));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let mut result = ResolutionResult::new("https://example.test/a.jpg", PhotoSource::Curated);
        result.place_id = Some("ChIJ123".to_string());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["imageUrl"], "https://example.test/a.jpg");
        assert_eq!(json["source"], "curated");
        assert_eq!(json["placeId"], "ChIJ123");
        assert!(json.get("attribution").is_none());
    }
}
