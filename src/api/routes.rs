//! API Routes
//!
//! Configures the Axum router: observability endpoints plus the catch-all
//! interception route.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{fetch_handler, health_handler, stats_handler, AppState};

/// Creates the main router.
///
/// # Endpoints
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
/// - everything else - Intercepted and routed through the caches
///
/// The two observability routes shadow identically named upstream paths;
/// all other traffic, any method, falls through to the interception
/// handler.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router: fixed routes first, interception as the fallback
    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(fetch_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
