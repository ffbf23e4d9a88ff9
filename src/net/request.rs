//! Fetch Request Module
//!
//! Normalizes intercepted requests into absolute-URL fetches.

use axum::http::{HeaderMap, Method, Uri};
use bytes::Bytes;
use url::Url;

use crate::error::{GatewayError, Result};

// == Fetch Request ==
/// One intercepted request, normalized to an absolute URL.
///
/// Proxy-style requests carrying an absolute-form URI keep their own
/// origin; origin-form requests resolve against the configured upstream.
/// The URL doubles as the cache key (only GET responses are ever stored,
/// so the method needs no place in the key).
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Request method
    pub method: Method,
    /// Absolute request URL
    pub url: Url,
    /// Forwarded request headers
    pub headers: Vec<(String, String)>,
    /// Forwarded request body, if any
    pub body: Option<Bytes>,
}

impl FetchRequest {
    // == Constructor ==
    /// Creates a bare GET request for the given URL.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    // == From Intercepted Parts ==
    /// Builds a fetch request from an intercepted HTTP request.
    ///
    /// # Arguments
    /// * `method` - Request method
    /// * `uri` - Incoming URI, origin-form or absolute-form
    /// * `headers` - Incoming headers; host is dropped, the rest forwarded
    /// * `body` - Request body bytes (None when empty)
    /// * `upstream_origin` - Origin that origin-form URIs resolve against
    pub fn from_parts(
        method: Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Option<Bytes>,
        upstream_origin: &Url,
    ) -> Result<Self> {
        let url = if uri.scheme().is_some() {
            Url::parse(&uri.to_string())
                .map_err(|e| GatewayError::InvalidRequest(format!("bad absolute URI: {e}")))?
        } else {
            let path_and_query = uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            upstream_origin
                .join(path_and_query)
                .map_err(|e| GatewayError::InvalidRequest(format!("bad request path: {e}")))?
        };

        let headers = headers
            .iter()
            .filter(|(name, _)| name.as_str() != "host")
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }

    // == Cache Key ==
    /// The key this request's response is stored and looked up under.
    pub fn key(&self) -> &str {
        self.url.as_str()
    }

    // == Is Cacheable ==
    /// Only GET responses are stored.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }

    // == Endpoint Match ==
    /// True when the request targets exactly the given origin and path.
    ///
    /// The query string is ignored for the match (it still distinguishes
    /// cache keys); a different path or origin does not match.
    pub fn matches_endpoint(&self, origin: &str, path: &str) -> bool {
        self.url.origin().ascii_serialization() == origin && self.url.path() == path
    }
}
