//! Response DTOs for the gateway's observability endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of requests served from cache
    pub hits: u64,
    /// Number of requests routed to the network
    pub misses: u64,
    /// Number of evicted entries
    pub evictions: u64,
    /// Number of offline fallback documents served
    pub fallbacks: u64,
    /// Current number of entries across all partitions
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from routing counters
    pub fn new(hits: u64, misses: u64, evictions: u64, fallbacks: u64, total_entries: usize) -> Self {
        let total_requests = hits + misses;
        let hit_rate = if total_requests > 0 {
            hits as f64 / total_requests as f64
        } else {
            0.0
        };
        Self {
            hits,
            misses,
            evictions,
            fallbacks,
            total_entries,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
