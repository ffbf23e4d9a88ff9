//! API Module
//!
//! HTTP surface of the gateway: the catch-all interception route plus
//! observability endpoints.
//!
//! # Endpoints
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint
//! - anything else - Intercepted and routed through the caches

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
