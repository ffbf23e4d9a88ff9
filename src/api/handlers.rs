//! API Handlers
//!
//! HTTP request handlers: the catch-all interception handler and the
//! observability endpoints.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStorage, MemoryStorage, ALLOWED_PARTITIONS};
use crate::config::Config;
use crate::error::{GatewayError, Result};
use crate::gateway::CacheRouter;
use crate::models::{HealthResponse, StatsResponse};
use crate::net::{FetchRequest, HttpFetcher, NetworkFetcher};

/// Application state shared across all handlers.
///
/// The router, storage, and statistics handles all point at the same
/// underlying capabilities; storage and stats are kept directly so the
/// observability endpoints can read them without going through the router.
#[derive(Clone)]
pub struct AppState {
    /// Fetch-routing core
    pub router: Arc<CacheRouter>,
    /// Cache storage capability
    pub storage: Arc<dyn CacheStorage>,
    /// Routing counters
    pub stats: Arc<RwLock<CacheStats>>,
    /// Gateway configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState over the given capabilities.
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn NetworkFetcher>,
        config: Config,
    ) -> Self {
        let config = Arc::new(config);
        let stats = Arc::new(RwLock::new(CacheStats::new()));
        let router = Arc::new(CacheRouter::new(
            storage.clone(),
            fetcher,
            stats.clone(),
            config.clone(),
        ));
        Self {
            router,
            storage,
            stats,
            config,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the in-memory storage to the live HTTP fetcher.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new()?);
        Ok(Self::new(
            Arc::new(MemoryStorage::new()),
            fetcher,
            config.clone(),
        ))
    }
}

/// Catch-all handler: every request not claimed by an observability route
/// is normalized and routed through the caches.
pub async fn fetch_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("unreadable request body: {e}")))?;
    let body = if bytes.is_empty() { None } else { Some(bytes) };

    let fetch_request = FetchRequest::from_parts(
        parts.method,
        &parts.uri,
        &parts.headers,
        body,
        &state.config.upstream_origin,
    )?;

    let snapshot = state.router.handle_fetch(fetch_request).await?;
    Ok(snapshot.into_response())
}

/// Handler for GET /stats
///
/// Returns routing counters plus the live entry count across partitions.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.stats.read().await.clone();

    let mut total_entries = 0;
    for partition in ALLOWED_PARTITIONS {
        total_entries += state.storage.keys(partition).await?.len();
    }

    Ok(Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.evictions,
        stats.fallbacks,
        total_entries,
    )))
}

/// Handler for GET /health
///
/// Returns health status of the gateway.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
