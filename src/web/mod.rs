//! Web layer module
//!
//! HTTP interface for the aggregator: the playlist routes, the config
//! API and the health check. Handlers stay thin and delegate to the
//! pipeline and the policy store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, put},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::config::Config;
use crate::models::CategoryTable;
use crate::policy::PolicyStore;
use crate::sources::{HttpPlaylistFetcher, PlaylistFetcher};

pub mod cache;
pub mod handlers;
pub mod responses;

pub use responses::{ApiResponse, handle_error, handle_result};

use cache::ResponseCache;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub policy: Arc<PolicyStore>,
    pub fetcher: Arc<dyn PlaylistFetcher>,
    pub cache: Arc<ResponseCache>,
    pub categories: Arc<CategoryTable>,
}

impl AppState {
    /// Build production state from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(HttpPlaylistFetcher::new()?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Build state around a caller-supplied fetcher. Tests use this to
    /// drive the full HTTP surface with scripted documents.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        Self {
            policy: Arc::new(PolicyStore::new(config.policy.clone())),
            cache: Arc::new(ResponseCache::new(&config.cache)),
            categories: Arc::new(CategoryTable::default()),
            fetcher,
            config: Arc::new(config),
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config) -> Result<Self> {
        let addr = format!("{}:{}", config.web.host, config.web.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid listen address '{}:{}'",
                    config.web.host, config.web.port
                )
            })?;
        let state = AppState::new(config)?;
        Ok(Self {
            app: create_router(state),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until SIGTERM or SIGINT.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        tracing::info!("Listening on http://{}", self.addr);

        let shutdown_signal = async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};
                let mut sigterm =
                    signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
                let mut sigint =
                    signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        tracing::info!("Received SIGINT (Ctrl+C), shutting down gracefully");
                    }
                }
            }

            #[cfg(not(unix))]
            {
                use tokio::signal;
                signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
                tracing::info!("Received Ctrl+C, shutting down gracefully");
            }
        };

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;
        Ok(())
    }
}

/// Build the full route table over the given state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/merged.m3u", get(handlers::playlists::merged_playlist))
        .route(
            "/designated.m3u",
            get(handlers::playlists::designated_playlist),
        )
        .route(
            "/debug/directory",
            get(handlers::playlists::directory_report),
        )
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/config",
            get(handlers::config_api::get_settings).put(handlers::config_api::update_settings),
        )
        .route(
            "/api/config/sources",
            get(handlers::config_api::list_sources).post(handlers::config_api::add_source),
        )
        .route(
            "/api/config/sources/{key}",
            put(handlers::config_api::update_source).delete(handlers::config_api::remove_source),
        )
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
