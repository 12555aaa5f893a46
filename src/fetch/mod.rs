//! Remote photo fetchers
//!
//! Each remote tier sits behind a small trait so the resolver can be wired to
//! real HTTP clients or to in-process fakes:
//! - [`PhotoProxy`]: delegated server-side lookup that re-hosts the photo
//! - [`EncyclopediaApi`]: page thumbnail lookup by title and language
//! - [`PlacesApi`]: Places text search and photo download, used by the proxy
//!
//! HTTP clients are blocking (ureq) and run on the blocking thread pool.

pub mod places;
pub mod proxy;
pub mod wikipedia;

use async_trait::async_trait;

use crate::place::{PhotoRequest, PlacePhotoRecord, ResolutionResult};
use crate::source::PhotoSource;

pub use places::{DownloadedPhoto, PlaceCandidate, PlacePhotoRef, PlacesClient};
pub use proxy::{HttpProxyClient, ProxyRequest, ProxyResponse};
pub use wikipedia::WikipediaClient;

/// Sent with every outbound request; Wikimedia rejects anonymous agents.
pub const USER_AGENT: &str = concat!(
    "jelajah/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/jelajah-app/jelajah)"
);

/// Why a tier produced nothing. Every variant means "try the next tier".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Miss {
    #[error("tier not configured")]
    Disabled,

    #[error("no cache entry")]
    NotCached,

    #[error("cached url rejected ({0})")]
    Rejected(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("no results")]
    NoResults,

    #[error("place has no photos")]
    NoPhoto,

    #[error("upload failed: {0}")]
    Upload(String),
}

impl From<ureq::Error> for Miss {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => {
                Miss::Network(format!("HTTP {} from {}", code, without_query(response.get_url())))
            }
            ureq::Error::Transport(transport) => Miss::Network(match transport.message() {
                Some(message) => format!("{}: {}", transport.kind(), message),
                None => transport.kind().to_string(),
            }),
        }
    }
}

/// Query strings can carry API keys; keep them out of miss messages.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

impl From<std::io::Error> for Miss {
    fn from(err: std::io::Error) -> Self {
        Miss::Malformed(err.to_string())
    }
}

/// A photo found by a remote tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPhoto {
    pub image_url: String,
    pub source: PhotoSource,
    pub place_id: Option<String>,
    pub attribution: Option<String>,
}

impl FoundPhoto {
    pub fn new(image_url: impl Into<String>, source: PhotoSource) -> Self {
        Self {
            image_url: image_url.into(),
            source,
            place_id: None,
            attribution: None,
        }
    }

    pub fn with_attribution(mut self, attribution: Option<String>) -> Self {
        self.attribution = attribution;
        self
    }

    /// Cache row for this photo
    pub fn to_record(&self, place_name: &str) -> PlacePhotoRecord {
        PlacePhotoRecord::new(place_name, self.image_url.clone(), self.source)
            .with_place_id(self.place_id.clone())
            .with_attribution(self.attribution.clone())
    }
}

impl From<FoundPhoto> for ResolutionResult {
    fn from(found: FoundPhoto) -> Self {
        Self {
            image_url: found.image_url,
            source: found.source,
            place_id: found.place_id,
            attribution: found.attribution,
        }
    }
}

/// Delegated server-side photo lookup.
#[async_trait]
pub trait PhotoProxy: Send + Sync {
    async fn fetch(&self, request: &PhotoRequest) -> Result<FoundPhoto, Miss>;
}

/// Encyclopedia thumbnail lookup for one language.
#[async_trait]
pub trait EncyclopediaApi: Send + Sync {
    /// Thumbnail URL of the page titled `title`, `Miss::NoPhoto` if it has none
    async fn thumbnail(&self, language: &str, title: &str, width: u32) -> Result<String, Miss>;
}

/// Place search and photo download, the proxy's upstream.
#[async_trait]
pub trait PlacesApi: Send + Sync {
    /// First text-search result for `query`
    async fn search(&self, query: &str) -> Result<PlaceCandidate, Miss>;

    /// Download a photo, following redirects to the content CDN
    async fn download(&self, photo: &PlacePhotoRef, max_width: u32) -> Result<DownloadedPhoto, Miss>;
}

/// Run a blocking HTTP call on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, Miss>
where
    F: FnOnce() -> Result<T, Miss> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Miss::Network(format!("blocking task failed: {}", e)))?
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_photo_to_record() {
        let mut found = FoundPhoto::new("https://a.test/x.jpg", PhotoSource::GooglePlaces)
            .with_attribution(Some("Budi".to_string()));
        found.place_id = Some("ChIJ1".to_string());

        let record = found.to_record(" Tanah  Lot ");
        assert_eq!(record.place_name, "Tanah Lot");
        assert_eq!(record.source, PhotoSource::GooglePlaces);
        assert_eq!(record.place_id.as_deref(), Some("ChIJ1"));
        assert_eq!(record.attribution.as_deref(), Some("Budi"));

        let result: ResolutionResult = found.into();
        assert_eq!(result.image_url, "https://a.test/x.jpg");
        assert_eq!(result.source, PhotoSource::GooglePlaces);
    }

    #[test]
    fn test_without_query() {
        assert_eq!(
            without_query("http://127.0.0.1:9/photo?maxwidth=800&key=SECRET"),
            "http://127.0.0.1:9/photo"
        );
        assert_eq!(without_query("http://127.0.0.1:9/photo"), "http://127.0.0.1:9/photo");
    }

    #[tokio::test]
    async fn test_run_blocking_passes_through() {
        let ok = run_blocking(|| Ok::<_, Miss>(7)).await;
        assert_eq!(ok, Ok(7));

        let miss = run_blocking(|| Err::<u8, _>(Miss::NoResults)).await;
        assert_eq!(miss, Err(Miss::NoResults));
    }
}
