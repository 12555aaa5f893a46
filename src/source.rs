//! Photo provenance tags
//!
//! Every resolved photo carries the tier (or proxy branch) that produced it.
//! The tag is informational: it is persisted alongside cache rows but never
//! drives expiry or validation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a photo URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSource {
    /// Served from the persisted cache
    Cache,
    /// Places photo re-hosted to first-party storage
    GooglePlaces,
    /// Answered from the proxy's own cache
    GoogleCached,
    /// Third-party Places URL returned because re-hosting failed
    GoogleDirect,
    /// Wikipedia page thumbnail
    Wikimedia,
    /// Curated static table
    Curated,
    /// Category default image
    Fallback,
    /// The proxy found nothing
    NotFound,
}

impl PhotoSource {
    /// Get the string representation of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSource::Cache => "cache",
            PhotoSource::GooglePlaces => "google_places",
            PhotoSource::GoogleCached => "google_cached",
            PhotoSource::GoogleDirect => "google_direct",
            PhotoSource::Wikimedia => "wikimedia",
            PhotoSource::Curated => "curated",
            PhotoSource::Fallback => "fallback",
            PhotoSource::NotFound => "not_found",
        }
    }

    /// Get all sources
    pub fn all() -> &'static [PhotoSource] {
        &[
            PhotoSource::Cache,
            PhotoSource::GooglePlaces,
            PhotoSource::GoogleCached,
            PhotoSource::GoogleDirect,
            PhotoSource::Wikimedia,
            PhotoSource::Curated,
            PhotoSource::Fallback,
            PhotoSource::NotFound,
        ]
    }

    /// Whether a result with this source should be written back to the cache.
    ///
    /// Cache hits are already stored, and fallback/not-found results are not
    /// worth remembering.
    pub fn is_cacheable(&self) -> bool {
        !matches!(
            self,
            PhotoSource::Cache | PhotoSource::Fallback | PhotoSource::NotFound
        )
    }
}

impl FromStr for PhotoSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cache" => Ok(PhotoSource::Cache),
            "google_places" | "google" => Ok(PhotoSource::GooglePlaces),
            "google_cached" => Ok(PhotoSource::GoogleCached),
            "google_direct" => Ok(PhotoSource::GoogleDirect),
            "wikimedia" | "wikipedia" => Ok(PhotoSource::Wikimedia),
            "curated" => Ok(PhotoSource::Curated),
            "fallback" => Ok(PhotoSource::Fallback),
            "not_found" => Ok(PhotoSource::NotFound),
            _ => Err(Error::UnknownSource(s.to_string())),
        }
    }
}

impl std::fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_roundtrip() {
        for source in PhotoSource::all() {
            let parsed: PhotoSource = source.as_str().parse().unwrap();
            assert_eq!(*source, parsed);
        }
    }

    #[test]
    fn test_source_aliases() {
        assert_eq!(PhotoSource::from_str("Wikipedia").unwrap(), PhotoSource::Wikimedia);
        assert_eq!(PhotoSource::from_str(" google ").unwrap(), PhotoSource::GooglePlaces);
        assert!(PhotoSource::from_str("unsplash").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&PhotoSource::GoogleDirect).unwrap();
        assert_eq!(json, "\"google_direct\"");
    }

    #[test]
    fn test_cacheable_sources() {
        assert!(PhotoSource::GooglePlaces.is_cacheable());
        assert!(PhotoSource::Wikimedia.is_cacheable());
        assert!(PhotoSource::Curated.is_cacheable());
        assert!(!PhotoSource::Cache.is_cacheable());
        assert!(!PhotoSource::Fallback.is_cacheable());
        assert!(!PhotoSource::NotFound.is_cacheable());
    }
}
