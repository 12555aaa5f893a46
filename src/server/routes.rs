use axum::{
    extract::{Query, State},
    Json,
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};
use crate::fetch::{ProxyRequest, ProxyResponse};
use crate::place::{PhotoRequest, ResolutionResult, clamp_max_width};
use crate::server::AppState;
use crate::storage::CacheStats;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct PhotoParams {
    pub name: String,
    pub category: Option<String>,
    pub max_width: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl ToString) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: error.to_string() }))
}

fn unauthorized() -> ApiError {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse { error: "missing or invalid bearer token".to_string() }))
}

fn internal(error: impl ToString) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: error.to_string() }))
}

/// True when no token is configured or the request carries `Bearer <token>`
fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(token) = state.config.proxy_token() else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|given| given.trim() == token)
}

/// Proxy endpoint. Misses and upstream failures answer `imageUrl: null`.
pub async fn place_photo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProxyRequest>,
) -> Result<Json<ProxyResponse>, ApiError> {
    if !authorized(&state, &headers) {
        tracing::warn!("Rejected place-photo call without a valid bearer token");
        return Err(unauthorized());
    }
    if body.place_name.trim().is_empty() {
        return Err(bad_request("placeName must not be empty"));
    }

    let Some(photos) = state.photos.as_ref() else {
        tracing::warn!("place-photo called without a Places API key configured");
        return Ok(Json(ProxyResponse::not_found()));
    };

    let max_width = clamp_max_width(body.max_width.unwrap_or_else(|| state.config.max_width()));
    match photos.fetch_photo(&body.place_name, max_width).await {
        Ok(found) => Ok(Json(ProxyResponse::found(&found))),
        Err(miss) => {
            tracing::info!("No place photo for {:?}: {}", body.place_name, miss);
            Ok(Json(ProxyResponse::not_found()))
        }
    }
}

/// Full tiered resolution for one place
pub async fn resolve_photo(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PhotoParams>,
) -> Result<Json<ResolutionResult>, ApiError> {
    let mut request = PhotoRequest::new(&params.name)
        .map_err(bad_request)?
        .with_max_width(params.max_width.unwrap_or_else(|| state.config.max_width()));
    if let Some(category) = params.category {
        request = request.with_category(category);
    }

    Ok(Json(state.resolver.resolve(&request).await))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<CacheStats>, ApiError> {
    let stats = state.store.stats().map_err(internal)?;
    Ok(Json(stats))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JelajahConfig;
    use crate::resolver::WriteBack;
    use crate::source::PhotoSource;

    fn offline_config(dir: &std::path::Path) -> JelajahConfig {
        let mut config = JelajahConfig::default();
        config.database = Some(dir.join("photos.db").to_string_lossy().to_string());
        config.storage.dir = Some(dir.join("objects").to_string_lossy().to_string());
        config.wikipedia.enabled = Some(false);
        config
    }

    fn offline_state(dir: &std::path::Path) -> Arc<AppState> {
        Arc::new(AppState::from_config(offline_config(dir), WriteBack::Awaited).unwrap())
    }

    #[tokio::test]
    async fn test_resolve_photo_offline() {
        let dir = tempfile::tempdir().unwrap();
        let state = offline_state(dir.path());

        let Json(result) = resolve_photo(
            State(state.clone()),
            Query(PhotoParams {
                name: "Borobudur".to_string(),
                category: None,
                max_width: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.source, PhotoSource::Curated);

        let Json(result) = resolve_photo(
            State(state),
            Query(PhotoParams {
                name: "Pantai Tanpa Nama".to_string(),
                category: Some("pantai".to_string()),
                max_width: Some(400),
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.source, PhotoSource::Fallback);
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let state = offline_state(dir.path());

        let err = resolve_photo(
            State(state.clone()),
            Query(PhotoParams {
                name: "   ".to_string(),
                category: None,
                max_width: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let err = place_photo(
            State(state),
            HeaderMap::new(),
            Json(ProxyRequest {
                place_name: String::new(),
                max_width: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_place_photo_without_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = offline_state(dir.path());

        let Json(response) = place_photo(
            State(state),
            HeaderMap::new(),
            Json(ProxyRequest {
                place_name: "Tanah Lot".to_string(),
                max_width: Some(800),
            }),
        )
        .await
        .unwrap();
        assert!(response.image_url.is_none());
        assert_eq!(response.source.as_deref(), Some("not_found"));
    }

    fn tanah_lot() -> Json<ProxyRequest> {
        Json(ProxyRequest {
            place_name: "Tanah Lot".to_string(),
            max_width: None,
        })
    }

    #[tokio::test]
    async fn test_place_photo_requires_configured_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(dir.path());
        config.proxy.token = Some("s3cret".to_string());
        let state = Arc::new(AppState::from_config(config, WriteBack::Awaited).unwrap());

        let err = place_photo(State(state.clone()), HeaderMap::new(), tanah_lot())
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        let mut wrong = HeaderMap::new();
        wrong.insert(header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        let err = place_photo(State(state.clone()), wrong, tanah_lot()).await.unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);

        let mut right = HeaderMap::new();
        right.insert(header::AUTHORIZATION, "Bearer s3cret".parse().unwrap());
        let Json(response) = place_photo(State(state), right, tanah_lot()).await.unwrap();
        assert_eq!(response.source.as_deref(), Some("not_found"));
    }

    #[tokio::test]
    async fn test_stats_count_written_back_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = offline_config(dir.path());
        config.cache.accepted_signatures = vec!["commons.wikimedia.org".to_string()];
        let state = Arc::new(AppState::from_config(config, WriteBack::Awaited).unwrap());

        let _ = resolve_photo(
            State(state.clone()),
            Query(PhotoParams {
                name: "Raja Ampat".to_string(),
                category: None,
                max_width: None,
            }),
        )
        .await
        .unwrap();

        let Json(stats) = get_stats(State(state)).await.unwrap();
        assert_eq!(stats.photos, 1);
        assert_eq!(stats.by_source, vec![("curated".to_string(), 1)]);
    }
}
