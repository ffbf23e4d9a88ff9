//! Response Snapshot Module
//!
//! Defines the stored form of an upstream response.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;

/// Headers that describe the transfer rather than the resource.
///
/// They are dropped when snapshotting so a replayed response gets fresh
/// framing from the server stack.
const HOP_BY_HOP_HEADERS: &[&str] = &["connection", "content-length", "transfer-encoding"];

// == Response Snapshot ==
/// A stored copy of one upstream response: status, headers, body bytes.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// HTTP status code of the original response
    pub status: u16,
    /// Response headers, minus transfer framing
    pub headers: Vec<(String, String)>,
    /// Full body snapshot
    pub body: Bytes,
}

impl ResponseSnapshot {
    // == Constructor ==
    /// Creates a snapshot from response parts, dropping framing headers.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        let headers = headers
            .into_iter()
            .filter(|(name, _)| {
                !HOP_BY_HOP_HEADERS
                    .iter()
                    .any(|hop| name.eq_ignore_ascii_case(hop))
            })
            .collect();
        Self {
            status,
            headers,
            body,
        }
    }

    // == Is Success ==
    /// True for 2xx statuses; only these are worth pre-caching at install.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    // == Header Lookup ==
    /// Returns the first header value with the given name, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// == IntoResponse Implementation ==
/// Replays the snapshot as a live HTTP response.
///
/// Headers that no longer parse are skipped rather than failing the whole
/// response.
impl IntoResponse for ResponseSnapshot {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                response.headers_mut().append(name, value);
            }
        }
        response
    }
}
