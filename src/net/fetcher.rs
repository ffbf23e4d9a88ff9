//! Network Fetcher Module
//!
//! Upstream fetch capability: a trait seam plus the reqwest-backed
//! implementation used in production.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::cache::ResponseSnapshot;
use crate::error::{GatewayError, Result};
use crate::net::FetchRequest;

// == Network Fetcher Capability ==
/// Performs one live network fetch and snapshots the response.
///
/// A returned snapshot may carry any status the upstream produced;
/// `Err` means the fetch itself failed (unreachable host, timeout,
/// connection reset), which is what the offline fallback path reacts to.
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot>;
}

// == HTTP Fetcher ==
/// reqwest-backed `NetworkFetcher` with connection pooling.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates the fetcher with a pooled, keep-alive HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .use_rustls_tls()
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NetworkFetcher for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot> {
        debug!(method = %request.method, url = %request.url, "Fetching from network");

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("{}: {e}", request.url)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Network(format!("{}: {e}", request.url)))?;

        Ok(ResponseSnapshot::new(status, headers, body))
    }
}
