//! Request logging.
//!
//! Subscriber setup lives in `sysacad-observability`; this module only holds
//! the per-request middleware.

use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs every request with a request id, its matched route, status and
/// latency. The id is echoed back in the `x-request-id` response header.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %matched_path,
    );

    let mut response = next.run(req).instrument(span.clone()).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    let _guard = span.enter();
    match status {
        400..=499 => warn!(status, latency_ms, "Client error"),
        500..=599 => error!(status, latency_ms, "Server error"),
        _ => info!(status, latency_ms, "Request completed"),
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
