use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::{ensure_db_dir, JelajahConfig};
use crate::fetch::{EncyclopediaApi, HttpProxyClient, PhotoProxy, PlacesClient, WikipediaClient};
use crate::resolver::{Resolver, WriteBack};
use crate::storage::{LocalObjectStore, SqliteStore};
use crate::validate::STORAGE_SIGNATURE;

pub mod rehost;
pub mod routes;

pub use rehost::PlacePhotoService;

/// Everything a resolution needs, wired from config
pub struct AppState {
    pub config: JelajahConfig,
    pub store: Arc<SqliteStore>,
    pub objects: Arc<LocalObjectStore>,
    /// Present only when a Places API key is configured
    pub photos: Option<Arc<PlacePhotoService>>,
    pub resolver: Resolver,
}

impl AppState {
    pub fn from_config(config: JelajahConfig, write_back: WriteBack) -> anyhow::Result<Self> {
        let db_path = config.database_path();
        ensure_db_dir(&db_path)?;
        let store = Arc::new(SqliteStore::open(&db_path)?);
        let policy = config.url_policy();

        let objects = Arc::new(LocalObjectStore::new(
            config.storage_dir(),
            config.bucket(),
            &config.public_base_url(),
        ));

        let photos = config.places_api_key().map(|key| {
            Arc::new(PlacePhotoService::new(
                Arc::new(PlacesClient::with_endpoint(key, config.places_endpoint())),
                objects.clone(),
                store.clone(),
                policy.clone(),
            ))
        });

        let proxy: Option<Arc<dyn PhotoProxy>> = match config.proxy.url.as_deref() {
            Some(url) => {
                tracing::info!("Delegating photo lookups to {}", url);
                Some(Arc::new(HttpProxyClient::new(url, config.proxy_token())))
            }
            None => photos.clone().map(|p| p as Arc<dyn PhotoProxy>),
        };
        if proxy.is_none() {
            tracing::info!("No proxy URL or Places API key configured, proxy tier disabled");
        }

        let encyclopedia: Option<Arc<dyn EncyclopediaApi>> = if config.wikipedia_enabled() {
            Some(Arc::new(WikipediaClient::new(config.wikipedia_endpoint())))
        } else {
            None
        };

        let resolver = Resolver::builder(store.clone())
            .proxy(proxy)
            .encyclopedia(encyclopedia)
            .languages(config.languages())
            .policy(policy)
            .write_back(write_back)
            .single_flight(config.single_flight())
            .build();

        Ok(Self {
            config,
            store,
            objects,
            photos,
            resolver,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let storage_path = format!("{}{}", STORAGE_SIGNATURE, state.objects.bucket());

    Router::new()
        .route("/place-photo", post(routes::place_photo))
        .route("/photo", get(routes::resolve_photo))
        .route("/stats", get(routes::get_stats))
        .route("/health", get(routes::health))
        .nest_service(&storage_path, ServeDir::new(state.objects.bucket_dir()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(port: u16, config: JelajahConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config, WriteBack::Detached)?);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}
