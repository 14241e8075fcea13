use crate::utils::request::{ClientIp, resolve_client_ip};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

/// Resolves the client address once per request and stores it as a `ClientIp`
/// extension for the rate limiter, metrics and bot verification.
pub async fn client_ip_middleware(
    State(trust_proxy): State<bool>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = resolve_client_ip(req.headers(), peer, trust_proxy) {
        req.extensions_mut().insert(ClientIp(ip));
    }

    next.run(req).await
}
