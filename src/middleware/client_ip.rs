use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Collect the identifiers a request may be attributed to: the raw
/// `X-Forwarded-For` value first, then the connection address. Empty values
/// are dropped; duplicates are kept.
pub async fn capture_client_ips(mut req: Request, next: Next) -> Response {
    let forwarded = req
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let ips: Vec<String> = [forwarded, remote]
        .into_iter()
        .flatten()
        .filter(|ip| !ip.is_empty())
        .collect();

    tracing::debug!(
        uri = %req.uri().path(),
        candidates = ips.len(),
        "Client IP middleware: captured rate-limit identifiers"
    );

    req.extensions_mut().insert(ClientIps(ips));
    next.run(req).await
}

/// Extractor for the captured client identifiers.
#[derive(Debug, Clone, Default)]
pub struct ClientIps(pub Vec<String>);
