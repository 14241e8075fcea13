use super::request_id::REQUEST_ID_HEADER;
use crate::utils::request::{ClientIp, client_key};
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// One structured line per request on the `metrics` target. Server errors are
/// logged at warn so failed roasts stand out.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client = client_key(req.extensions().get::<ClientIp>());
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(req).await;

    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(
            target: "metrics",
            %method, %path, %status, %latency_ms, %client, %request_id,
            "request_failed"
        );
    } else {
        info!(
            target: "metrics",
            %method, %path, %status, %latency_ms, %client, %request_id,
            "request_completed"
        );
    }

    response
}
