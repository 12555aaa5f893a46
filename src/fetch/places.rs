//! Places text search and photo download

use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::{Miss, PlacesApi, USER_AGENT, run_blocking};

pub const DEFAULT_PLACES_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/place";

/// Photos larger than this are not re-hosted
const MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

/// First search hit for a place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCandidate {
    pub place_id: Option<String>,
    pub name: String,
    pub photos: Vec<PlacePhotoRef>,
}

/// Reference to one photo of a place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacePhotoRef {
    pub reference: String,
    /// Plain-text author credit
    pub attribution: Option<String>,
}

/// Downloaded photo bytes
#[derive(Debug, Clone)]
pub struct DownloadedPhoto {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    /// CDN URL the photo API redirected to. `None` when the bytes came
    /// straight from the keyed photo endpoint.
    pub final_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    place_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    photos: Vec<PhotoEntry>,
}

#[derive(Debug, Deserialize)]
struct PhotoEntry {
    photo_reference: String,
    #[serde(default)]
    html_attributions: Vec<String>,
}

/// Places web service client
#[derive(Clone)]
pub struct PlacesClient {
    agent: ureq::Agent,
    api_key: String,
    endpoint: String,
}

impl PlacesClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_endpoint(api_key, DEFAULT_PLACES_ENDPOINT)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Photo API URL for a reference. Carries the API key, so it is only
    /// ever requested server side and never handed to callers.
    fn photo_url(&self, photo: &PlacePhotoRef, max_width: u32) -> String {
        format!(
            "{}/photo?maxwidth={}&photo_reference={}&key={}",
            self.endpoint, max_width, photo.reference, self.api_key
        )
    }
}

#[async_trait]
impl PlacesApi for PlacesClient {
    async fn search(&self, query: &str) -> Result<PlaceCandidate, Miss> {
        let agent = self.agent.clone();
        let url = format!("{}/textsearch/json", self.endpoint);
        let key = self.api_key.clone();
        let query = query.to_string();

        let body: String = run_blocking(move || {
            let response = agent
                .get(&url)
                .query("query", &query)
                .query("language", "id")
                .query("region", "id")
                .query("key", &key)
                .call()?;
            Ok(response.into_string()?)
        })
        .await?;

        parse_text_search(&body)
    }

    async fn download(&self, photo: &PlacePhotoRef, max_width: u32) -> Result<DownloadedPhoto, Miss> {
        let agent = self.agent.clone();
        let url = self.photo_url(photo, max_width);
        let key = self.api_key.clone();

        run_blocking(move || {
            let response = agent.get(&url).call()?;
            let final_url = Some(response.get_url())
                .filter(|served| !served.contains(key.as_str()))
                .map(str::to_string);
            let content_type = Some(response.content_type().to_string());

            let mut bytes = Vec::new();
            response
                .into_reader()
                .take(MAX_PHOTO_BYTES + 1)
                .read_to_end(&mut bytes)?;

            if bytes.len() as u64 > MAX_PHOTO_BYTES {
                return Err(Miss::Malformed(format!("photo exceeds {} bytes", MAX_PHOTO_BYTES)));
            }
            if bytes.is_empty() {
                return Err(Miss::NoPhoto);
            }

            Ok(DownloadedPhoto {
                bytes,
                content_type,
                final_url,
            })
        })
        .await
    }
}

/// Parse a text search body into its first candidate.
fn parse_text_search(body: &str) -> Result<PlaceCandidate, Miss> {
    let response: TextSearchResponse =
        serde_json::from_str(body).map_err(|e| Miss::Malformed(e.to_string()))?;

    match response.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(Miss::NoResults),
        other => {
            let detail = response.error_message.unwrap_or_default();
            return Err(Miss::Network(format!("Places status {} {}", other, detail).trim().to_string()));
        }
    }

    let first = response.results.into_iter().next().ok_or(Miss::NoResults)?;

    Ok(PlaceCandidate {
        place_id: first.place_id,
        name: first.name,
        photos: first
            .photos
            .into_iter()
            .filter(|p| !p.photo_reference.is_empty())
            .map(|p| PlacePhotoRef {
                reference: p.photo_reference,
                attribution: p.html_attributions.first().map(|a| strip_html(a)).filter(|a| !a.is_empty()),
            })
            .collect(),
    })
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("static tag pattern"))
}

/// Drop HTML tags from an attribution snippet
fn strip_html(html: &str) -> String {
    tag_pattern().replace_all(html, "").trim().to_string()
}
