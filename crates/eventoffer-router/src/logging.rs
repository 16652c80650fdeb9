use std::time::Instant;

use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, info, info_span, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs one line per request inside a span carrying the request id, and echoes
/// the id back in [`REQUEST_ID_HEADER`]. A caller-supplied id is kept.
pub async fn log_request(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("request", %request_id, %method, %path);

    let started = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| {
        let status = response.status().as_u16();
        if response.status().is_server_error() {
            warn!(status, latency_ms, "request failed");
        } else {
            info!(status, latency_ms, "request completed");
        }
    });
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
