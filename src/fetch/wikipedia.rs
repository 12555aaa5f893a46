//! Wikipedia page thumbnail lookup
//!
//! Uses the MediaWiki action API (`prop=pageimages`) so titles travel as
//! query parameters and redirects are followed server-side.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{EncyclopediaApi, Miss, USER_AGENT, run_blocking};

/// `{lang}` is replaced by the language code
pub const DEFAULT_WIKIPEDIA_ENDPOINT: &str = "https://{lang}.wikipedia.org/w/api.php";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

#[derive(Clone)]
pub struct WikipediaClient {
    agent: ureq::Agent,
    endpoint: String,
}

impl Default for WikipediaClient {
    fn default() -> Self {
        Self::new(DEFAULT_WIKIPEDIA_ENDPOINT)
    }
}

impl WikipediaClient {
    pub fn new(endpoint: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            endpoint: endpoint.to_string(),
        }
    }

    fn endpoint_for(&self, language: &str) -> String {
        self.endpoint.replace("{lang}", language)
    }
}

#[async_trait]
impl EncyclopediaApi for WikipediaClient {
    async fn thumbnail(&self, language: &str, title: &str, width: u32) -> Result<String, Miss> {
        let agent = self.agent.clone();
        let url = self.endpoint_for(language);
        let title = title.to_string();

        let body = run_blocking(move || {
            let response = agent
                .get(&url)
                .query("action", "query")
                .query("format", "json")
                .query("formatversion", "2")
                .query("prop", "pageimages")
                .query("piprop", "thumbnail")
                .query("pithumbsize", &width.to_string())
                .query("redirects", "1")
                .query("titles", &title)
                .call()?;
            Ok(response.into_string()?)
        })
        .await?;

        parse_thumbnail(&body)
    }
}

fn parse_thumbnail(body: &str) -> Result<String, Miss> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| Miss::Malformed(e.to_string()))?;

    let pages = response.query.map(|q| q.pages).unwrap_or_default();
    let page = pages.into_iter().find(|p| !p.missing).ok_or(Miss::NoResults)?;

    page.thumbnail
        .map(|t| t.source)
        .filter(|s| !s.is_empty())
        .ok_or(Miss::NoPhoto)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thumbnail() {
        let body = r#"{
            "batchcomplete": true,
            "query": {
                "normalized": [{"fromencoded": false, "from": "borobudur", "to": "Borobudur"}],
                "pages": [{
                    "pageid": 4431,
                    "ns": 0,
                    "title": "Borobudur",
                    "thumbnail": {
                        "source": "https://upload.wikimedia.org/wikipedia/commons/thumb/8/8c/Borobudur.jpg/800px-Borobudur.jpg",
                        "width": 800,
                        "height": 533
                    }
                }]
            }
        }"#;
        assert_eq!(
            parse_thumbnail(body).unwrap(),
            "https://upload.wikimedia.org/wikipedia/commons/thumb/8/8c/Borobudur.jpg/800px-Borobudur.jpg"
        );
    }

    #[test]
    fn test_missing_page() {
        let body = r#"{"query": {"pages": [{"ns": 0, "title": "Desa Antah", "missing": true}]}}"#;
        assert_eq!(parse_thumbnail(body), Err(Miss::NoResults));
    }

    #[test]
    fn test_page_without_thumbnail() {
        let body = r#"{"query": {"pages": [{"pageid": 1, "ns": 0, "title": "Situ Patenggang"}]}}"#;
        assert_eq!(parse_thumbnail(body), Err(Miss::NoPhoto));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(parse_thumbnail(r#"{"batchcomplete": true}"#), Err(Miss::NoResults));
        assert!(matches!(parse_thumbnail("not json"), Err(Miss::Malformed(_))));
    }

    #[test]
    fn test_endpoint_language() {
        let client = WikipediaClient::default();
        assert_eq!(client.endpoint_for("id"), "https://id.wikipedia.org/w/api.php");
    }
}
