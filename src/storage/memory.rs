//! In-memory photo cache

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::PhotoCache;
use crate::Result;
use crate::place::{PlacePhotoRecord, normalize_place_name};

/// HashMap-backed cache for embedding and tests
#[derive(Default)]
pub struct MemoryCache {
    records: Mutex<HashMap<String, PlacePhotoRecord>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoCache for MemoryCache {
    async fn get(&self, place_name: &str) -> Result<Option<PlacePhotoRecord>> {
        let key = normalize_place_name(place_name);
        let records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        Ok(records.get(&key).cloned())
    }

    async fn upsert(&self, record: &PlacePhotoRecord) -> Result<()> {
        let key = normalize_place_name(&record.place_name);
        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        match records.get_mut(&key) {
            Some(existing) => {
                let cached_at = existing.cached_at;
                *existing = record.clone();
                existing.place_name = key;
                existing.cached_at = cached_at;
            }
            None => {
                let mut record = record.clone();
                record.place_name = key.clone();
                records.insert(key, record);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PhotoSource;

    #[tokio::test]
    async fn test_upsert_overwrites_by_key() {
        let cache = MemoryCache::new();
        cache
            .upsert(&PlacePhotoRecord::new("Ubud ", "https://a.test/1.jpg", PhotoSource::Curated))
            .await
            .unwrap();
        cache
            .upsert(&PlacePhotoRecord::new(" Ubud", "https://a.test/2.jpg", PhotoSource::Wikimedia))
            .await
            .unwrap();

        assert_eq!(cache.len(), 1);
        let stored = cache.get("Ubud").await.unwrap().unwrap();
        assert_eq!(stored.image_url, "https://a.test/2.jpg");
        assert_eq!(stored.source, PhotoSource::Wikimedia);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("Bromo").await.unwrap().is_none());
    }
}
