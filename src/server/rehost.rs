//! Place photo proxy: search, download, re-host
//!
//! Server side of the delegated tier. Finds the first photo of the first
//! Places text-search hit, copies it into first-party storage and answers
//! with the first-party URL. If only the upload fails, the CDN URL the
//! download was served from is returned instead. A failed download is a
//! miss, since the photo API URL carries the API key.

use std::sync::Arc;

use async_trait::async_trait;

use crate::fetch::{FoundPhoto, Miss, PhotoProxy, PlacesApi};
use crate::place::{PhotoRequest, clamp_max_width, normalize_place_name};
use crate::source::PhotoSource;
use crate::storage::{ObjectStore, PhotoCache};
use crate::validate::UrlPolicy;

pub struct PlacePhotoService {
    places: Arc<dyn PlacesApi>,
    objects: Arc<dyn ObjectStore>,
    cache: Arc<dyn PhotoCache>,
    policy: UrlPolicy,
}

impl PlacePhotoService {
    pub fn new(
        places: Arc<dyn PlacesApi>,
        objects: Arc<dyn ObjectStore>,
        cache: Arc<dyn PhotoCache>,
        policy: UrlPolicy,
    ) -> Self {
        Self {
            places,
            objects,
            cache,
            policy,
        }
    }

    /// Look up and re-host a photo for `place_name`
    pub async fn fetch_photo(&self, place_name: &str, max_width: u32) -> Result<FoundPhoto, Miss> {
        let name = normalize_place_name(place_name);
        if name.is_empty() {
            return Err(Miss::NoResults);
        }

        if let Some(found) = self.cached(&name).await {
            tracing::debug!("Proxy cache hit for {:?}", name);
            return Ok(found);
        }

        let candidate = self.places.search(&name).await?;
        let photo = candidate.photos.first().ok_or(Miss::NoPhoto)?;

        let download = match self.places.download(photo, clamp_max_width(max_width)).await {
            Ok(download) => download,
            Err(miss) => {
                tracing::warn!("Photo download failed for {:?}: {}", name, miss);
                return Err(miss);
            }
        };

        let stored = self
            .objects
            .put(&name, &download.bytes, download.content_type.as_deref())
            .await;

        match stored {
            Ok(url) => {
                let found = FoundPhoto {
                    image_url: url,
                    source: PhotoSource::GooglePlaces,
                    place_id: candidate.place_id.clone(),
                    attribution: photo.attribution.clone(),
                };
                if let Err(e) = self.cache.upsert(&found.to_record(&name)).await {
                    tracing::warn!("Proxy failed to cache {:?}: {}", name, e);
                }
                Ok(found)
            }
            Err(e) => {
                let miss = Miss::Upload(e.to_string());
                // without a CDN redirect the only third-party URL is the keyed one
                let Some(cdn_url) = download.final_url else {
                    tracing::warn!("Re-hosting {:?} failed ({}) and no CDN URL is known", name, miss);
                    return Err(miss);
                };
                tracing::warn!("Re-hosting {:?} failed ({}), returning third-party URL", name, miss);
                Ok(FoundPhoto {
                    image_url: cdn_url,
                    source: PhotoSource::GoogleDirect,
                    place_id: candidate.place_id.clone(),
                    attribution: photo.attribution.clone(),
                })
            }
        }
    }

    /// Previously re-hosted photo, reported as `google_cached`
    async fn cached(&self, name: &str) -> Option<FoundPhoto> {
        let record = match self.cache.get(name).await {
            Ok(record) => record?,
            Err(e) => {
                tracing::warn!("Proxy cache read failed for {:?}: {}", name, e);
                return None;
            }
        };

        let rehosted = matches!(record.source, PhotoSource::GooglePlaces | PhotoSource::GoogleCached);
        if !rehosted || self.policy.accept(&record.image_url).is_none() {
            return None;
        }

        Some(FoundPhoto {
            image_url: record.image_url,
            source: PhotoSource::GoogleCached,
            place_id: record.place_id,
            attribution: record.attribution,
        })
    }
}

#[async_trait]
impl PhotoProxy for PlacePhotoService {
    async fn fetch(&self, request: &PhotoRequest) -> Result<FoundPhoto, Miss> {
        self.fetch_photo(&request.place_name, request.max_width).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{DownloadedPhoto, PlaceCandidate, PlacePhotoRef, PlacesClient};
    use crate::place::PlacePhotoRecord;
    use crate::storage::{LocalObjectStore, MemoryCache};
    use crate::{Error, Result};
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    struct FakePlaces {
        candidate: std::result::Result<PlaceCandidate, Miss>,
        download: std::result::Result<DownloadedPhoto, Miss>,
        searches: AtomicUsize,
        last_width: AtomicU32,
    }

    impl FakePlaces {
        fn with_photo() -> Self {
            Self {
                candidate: Ok(PlaceCandidate {
                    place_id: Some("ChIJ_tanahlot".to_string()),
                    name: "Pura Tanah Lot".to_string(),
                    photos: vec![PlacePhotoRef {
                        reference: "AWU5eFh".to_string(),
                        attribution: Some("Made Wirawan".to_string()),
                    }],
                }),
                download: Ok(DownloadedPhoto {
                    bytes: b"\xff\xd8\xff\xe0jpeg".to_vec(),
                    content_type: Some("image/jpeg".to_string()),
                    final_url: Some("https://lh3.googleusercontent.com/places/AWU5eFh=s800".to_string()),
                }),
                searches: AtomicUsize::new(0),
                last_width: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PlacesApi for FakePlaces {
        async fn search(&self, _query: &str) -> std::result::Result<PlaceCandidate, Miss> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            self.candidate.clone()
        }

        async fn download(&self, _photo: &PlacePhotoRef, max_width: u32) -> std::result::Result<DownloadedPhoto, Miss> {
            self.last_width.store(max_width, Ordering::SeqCst);
            self.download.clone()
        }
    }

    struct FullDisk;

    #[async_trait]
    impl ObjectStore for FullDisk {
        async fn put(&self, _name_hint: &str, _bytes: &[u8], _content_type: Option<&str>) -> Result<String> {
            Err(Error::ObjectStore("no space left on device".to_string()))
        }
    }

    fn make_service(places: Arc<FakePlaces>, objects: Arc<dyn ObjectStore>, cache: Arc<MemoryCache>) -> PlacePhotoService {
        PlacePhotoService::new(places, objects, cache, UrlPolicy::default())
    }

    #[tokio::test]
    async fn test_rehosts_first_photo() {
        let dir = tempfile::tempdir().unwrap();
        let objects = Arc::new(LocalObjectStore::new(dir.path(), "place-photos", "http://localhost:8787"));
        let cache = Arc::new(MemoryCache::new());
        let service = make_service(Arc::new(FakePlaces::with_photo()), objects, cache.clone());

        let found = service.fetch_photo("Tanah Lot", 800).await.unwrap();

        assert_eq!(found.source, PhotoSource::GooglePlaces);
        assert!(found.image_url.contains("/storage/v1/object/public/place-photos/tanah-lot-"));
        assert_eq!(found.place_id.as_deref(), Some("ChIJ_tanahlot"));
        assert_eq!(found.attribution.as_deref(), Some("Made Wirawan"));

        let stored = cache.get("Tanah Lot").await.unwrap().unwrap();
        assert_eq!(stored.image_url, found.image_url);
    }

    #[tokio::test]
    async fn test_second_lookup_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let objects = Arc::new(LocalObjectStore::new(dir.path(), "place-photos", "http://localhost:8787"));
        let places = Arc::new(FakePlaces::with_photo());
        let service = make_service(places.clone(), objects, Arc::new(MemoryCache::new()));

        let first = service.fetch_photo("Tanah Lot", 800).await.unwrap();
        let second = service.fetch_photo("Tanah Lot", 800).await.unwrap();

        assert_eq!(second.source, PhotoSource::GoogleCached);
        assert_eq!(second.image_url, first.image_url);
        assert_eq!(places.searches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_returns_third_party_url() {
        let cache = Arc::new(MemoryCache::new());
        let service = make_service(Arc::new(FakePlaces::with_photo()), Arc::new(FullDisk), cache.clone());

        let found = service.fetch_photo("Tanah Lot", 800).await.unwrap();

        assert_eq!(found.source, PhotoSource::GoogleDirect);
        assert_eq!(found.image_url, "https://lh3.googleusercontent.com/places/AWU5eFh=s800");
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_without_cdn_url_is_a_miss() {
        let mut places = FakePlaces::with_photo();
        if let Ok(download) = places.download.as_mut() {
            download.final_url = None;
        }
        let service = make_service(Arc::new(places), Arc::new(FullDisk), Arc::new(MemoryCache::new()));

        let miss = service.fetch_photo("Tanah Lot", 800).await.unwrap_err();
        assert!(matches!(miss, Miss::Upload(_)), "unexpected {:?}", miss);
    }

    #[tokio::test]
    async fn test_download_failure_is_a_miss() {
        let mut places = FakePlaces::with_photo();
        places.download = Err(Miss::Network("HTTP 403".to_string()));
        let cache = Arc::new(MemoryCache::new());
        let service = make_service(Arc::new(places), Arc::new(FullDisk), cache.clone());

        let result = service.fetch_photo("Tanah Lot", 640).await;

        assert_eq!(result, Err(Miss::Network("HTTP 403".to_string())));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_never_exposes_api_key() {
        use axum::http::StatusCode;

        let app = axum::Router::new()
            .route(
                "/textsearch/json",
                axum::routing::get(|| async {
                    axum::Json(serde_json::json!({
                        "status": "OK",
                        "results": [{
                            "place_id": "ChIJ_tanahlot",
                            "name": "Pura Tanah Lot",
                            "photos": [{"photo_reference": "AWU5eFh", "html_attributions": []}]
                        }]
                    }))
                }),
            )
            .route("/photo", axum::routing::get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = crate::fetch::test_server::serve(app).await;

        let dir = tempfile::tempdir().unwrap();
        let objects = Arc::new(LocalObjectStore::new(dir.path(), "place-photos", "http://localhost:8787"));
        let cache = Arc::new(MemoryCache::new());
        let service = PlacePhotoService::new(
            Arc::new(PlacesClient::with_endpoint("SECRET_KEY", &base)),
            objects,
            cache.clone(),
            UrlPolicy::default(),
        );

        let miss = service.fetch_photo("Tanah Lot", 800).await.unwrap_err();

        assert!(matches!(miss, Miss::Network(_)), "unexpected {:?}", miss);
        assert!(!miss.to_string().contains("SECRET_KEY"));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_requested_width_is_clamped() {
        let places = Arc::new(FakePlaces::with_photo());
        let service = make_service(places.clone(), Arc::new(FullDisk), Arc::new(MemoryCache::new()));

        service.fetch_photo("Tanah Lot", 5000).await.unwrap();
        assert_eq!(places.last_width.load(Ordering::SeqCst), crate::place::MAX_PHOTO_WIDTH);

        service.fetch_photo("Tanah Lot", 0).await.unwrap();
        assert_eq!(places.last_width.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_results_and_no_photos() {
        let mut places = FakePlaces::with_photo();
        places.candidate = Err(Miss::NoResults);
        let service = make_service(Arc::new(places), Arc::new(FullDisk), Arc::new(MemoryCache::new()));
        assert_eq!(service.fetch_photo("Desa Sunyi", 800).await, Err(Miss::NoResults));

        let mut places = FakePlaces::with_photo();
        if let Ok(candidate) = places.candidate.as_mut() {
            candidate.photos.clear();
        }
        let service = make_service(Arc::new(places), Arc::new(FullDisk), Arc::new(MemoryCache::new()));
        assert_eq!(service.fetch_photo("Warung Makan", 800).await, Err(Miss::NoPhoto));
    }

    #[tokio::test]
    async fn test_foreign_cache_rows_are_ignored() {
        let cache = Arc::new(MemoryCache::new());
        cache
            .upsert(&PlacePhotoRecord::new(
                "Tanah Lot",
                "https://lh3.googleusercontent.com/old",
                PhotoSource::Curated,
            ))
            .await
            .unwrap();
        let places = Arc::new(FakePlaces::with_photo());
        let service = make_service(places.clone(), Arc::new(FullDisk), cache);

        let found = service.fetch_photo("Tanah Lot", 800).await.unwrap();

        assert_eq!(found.source, PhotoSource::GoogleDirect);
        assert_eq!(places.searches.load(Ordering::SeqCst), 1);
    }
}
