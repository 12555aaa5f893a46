//! Client for the place-photo proxy endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{FoundPhoto, Miss, PhotoProxy, USER_AGENT, run_blocking};
use crate::place::PhotoRequest;
use crate::source::PhotoSource;

/// Proxy request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    pub place_name: String,
    #[serde(default)]
    pub max_width: Option<u32>,
}

/// Proxy response body. `image_url` is null when nothing was found.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

impl ProxyResponse {
    pub fn not_found() -> Self {
        Self {
            source: Some(PhotoSource::NotFound.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn found(photo: &FoundPhoto) -> Self {
        Self {
            image_url: Some(photo.image_url.clone()),
            source: Some(photo.source.as_str().to_string()),
            place_id: photo.place_id.clone(),
            attribution: photo.attribution.clone(),
        }
    }

    /// Interpret the body as a tier outcome
    pub fn into_found(self) -> Result<FoundPhoto, Miss> {
        let image_url = self
            .image_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(Miss::NoResults)?;

        // only the proxy's own provenance tags are meaningful here
        let source = match self.source.as_deref().map(str::parse::<PhotoSource>) {
            Some(Ok(s @ (PhotoSource::GoogleCached | PhotoSource::GoogleDirect))) => s,
            _ => PhotoSource::GooglePlaces,
        };

        Ok(FoundPhoto {
            image_url,
            source,
            place_id: self.place_id,
            attribution: self.attribution,
        })
    }
}

/// HTTP client for a remote proxy deployment
#[derive(Clone)]
pub struct HttpProxyClient {
    agent: ureq::Agent,
    url: String,
    bearer: Option<String>,
}

impl HttpProxyClient {
    pub fn new(url: &str, bearer: Option<&str>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            url: url.to_string(),
            bearer: bearer.map(str::to_string),
        }
    }
}

#[async_trait]
impl PhotoProxy for HttpProxyClient {
    async fn fetch(&self, request: &PhotoRequest) -> Result<FoundPhoto, Miss> {
        let agent = self.agent.clone();
        let url = self.url.clone();
        let bearer = self.bearer.clone();
        let body = ProxyRequest {
            place_name: request.place_name.clone(),
            max_width: Some(request.max_width),
        };

        let response: ProxyResponse = run_blocking(move || {
            let mut call = agent.post(&url);
            if let Some(token) = bearer {
                call = call.set("Authorization", &format!("Bearer {}", token));
            }
            let response = call.send_json(&body)?;
            response
                .into_json::<ProxyResponse>()
                .map_err(|e| Miss::Malformed(e.to_string()))
        })
        .await?;

        response.into_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<FoundPhoto, Miss> {
        serde_json::from_str::<ProxyResponse>(json).unwrap().into_found()
    }

    #[test]
    fn test_found_response() {
        let found = parse(
            r#"{"imageUrl": "https://x.test/storage/v1/object/public/p/a.jpg", "source": "google_places", "placeId": "ChIJ1"}"#,
        )
        .unwrap();
        assert_eq!(found.source, PhotoSource::GooglePlaces);
        assert_eq!(found.place_id.as_deref(), Some("ChIJ1"));
    }

    #[test]
    fn test_direct_and_cached_sources_survive() {
        let found = parse(r#"{"imageUrl": "https://lh3.googleusercontent.com/a", "source": "google_direct"}"#).unwrap();
        assert_eq!(found.source, PhotoSource::GoogleDirect);

        let found = parse(r#"{"imageUrl": "https://lh3.googleusercontent.com/a", "source": "google_cached"}"#).unwrap();
        assert_eq!(found.source, PhotoSource::GoogleCached);
    }

    #[test]
    fn test_foreign_source_maps_to_places() {
        let found = parse(r#"{"imageUrl": "https://lh3.googleusercontent.com/a", "source": "curated"}"#).unwrap();
        assert_eq!(found.source, PhotoSource::GooglePlaces);

        let found = parse(r#"{"imageUrl": "https://lh3.googleusercontent.com/a"}"#).unwrap();
        assert_eq!(found.source, PhotoSource::GooglePlaces);
    }

    #[test]
    fn test_null_or_blank_url_is_a_miss() {
        assert_eq!(parse(r#"{"imageUrl": null, "source": "not_found"}"#), Err(Miss::NoResults));
        assert_eq!(parse(r#"{"imageUrl": "  "}"#), Err(Miss::NoResults));
    }

    #[test]
    fn test_response_roundtrip_omits_empty_fields() {
        let json = serde_json::to_value(ProxyResponse::not_found()).unwrap();
        assert!(json["imageUrl"].is_null());
        assert_eq!(json["source"], "not_found");
        assert!(json.get("placeId").is_none());
    }

    #[tokio::test]
    async fn test_client_sends_bearer_token() {
        use axum::http::HeaderMap;
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let captured = seen.clone();
        let app = axum::Router::new().route(
            "/place-photo",
            axum::routing::post(move |headers: HeaderMap, axum::Json(body): axum::Json<ProxyRequest>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    assert_eq!(body.place_name, "Tanah Lot");
                    assert_eq!(body.max_width, Some(640));
                    axum::Json(serde_json::json!({
                        "imageUrl": "https://x.test/storage/v1/object/public/p/tanah-lot.jpg",
                        "source": "google_cached",
                        "placeId": "ChIJ_tanahlot"
                    }))
                }
            }),
        );
        let base = crate::fetch::test_server::serve(app).await;
        let client = HttpProxyClient::new(&format!("{}/place-photo", base), Some("tok"));

        let request = PhotoRequest::new("Tanah Lot").unwrap().with_max_width(640);
        let found = client.fetch(&request).await.unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("Bearer tok"));
        assert_eq!(found.source, PhotoSource::GoogleCached);
        assert_eq!(found.image_url, "https://x.test/storage/v1/object/public/p/tanah-lot.jpg");
        assert_eq!(found.place_id.as_deref(), Some("ChIJ_tanahlot"));
    }

    #[tokio::test]
    async fn test_server_error_is_network_miss() {
        let app = axum::Router::new().route(
            "/place-photo",
            axum::routing::post(|| async { axum::http::StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let base = crate::fetch::test_server::serve(app).await;
        let client = HttpProxyClient::new(&format!("{}/place-photo", base), None);

        let miss = client.fetch(&PhotoRequest::new("Tanah Lot").unwrap()).await.unwrap_err();
        assert!(matches!(miss, Miss::Network(ref msg) if msg.contains("500")), "unexpected {:?}", miss);
    }

    #[tokio::test]
    async fn test_not_found_body_is_a_miss() {
        let app = axum::Router::new().route(
            "/place-photo",
            axum::routing::post(|| async { axum::Json(ProxyResponse::not_found()) }),
        );
        let base = crate::fetch::test_server::serve(app).await;
        let client = HttpProxyClient::new(&format!("{}/place-photo", base), None);

        let miss = client.fetch(&PhotoRequest::new("Desa Sunyi").unwrap()).await.unwrap_err();
        assert_eq!(miss, Miss::NoResults);
    }
}
