use axum::http::HeaderMap;
use std::net::IpAddr;

/// Resolved client address, stored in request extensions by the client IP middleware.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// Extract client IP from proxy headers
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    // Check X-Forwarded-For first (proxy)
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(ip.to_string());
    }
    // Check X-Real-IP
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Client address used for rate limiting and bot verification. Proxy headers are only
/// honoured when `trust_proxy` is set; otherwise the socket peer address wins.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trust_proxy: bool,
) -> Option<String> {
    let forwarded = if trust_proxy {
        extract_client_ip(headers)
    } else {
        None
    };
    forwarded.or_else(|| peer.map(|ip| ip.to_string()))
}

/// Rate limit bucket key; requests with no resolvable address share one bucket.
pub fn client_key(client: Option<&ClientIp>) -> String {
    client
        .map(|ClientIp(ip)| ip.clone())
        .unwrap_or_else(|| "unknown".to_string())
}
