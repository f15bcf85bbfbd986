//! Request middleware: rate limiting, HTTPS redirect, cache headers and the
//! per-request tracing span.

use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::Span;

use crate::api::state::AppState;
use crate::api::ApiError;

/// Client address used for rate limiting and logs.
///
/// `X-Forwarded-For` is only read when the peer itself is a trusted proxy.
/// Hops are then walked from the nearest outward and the first address not
/// belonging to a trusted proxy is the client. Hops further out were written
/// by the client and are ignored.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &axum::http::Extensions,
    trusted_proxies: &[IpAddr],
) -> String {
    let Some(peer) = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        return "unknown".to_string();
    };
    if !trusted_proxies.contains(&peer) {
        return peer.to_string();
    }

    let hops: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();

    let mut client = peer;
    for hop in hops.into_iter().rev() {
        let Ok(ip) = hop.parse::<IpAddr>() else {
            break;
        };
        client = ip;
        if !trusted_proxies.contains(&ip) {
            break;
        }
    }
    client.to_string()
}

pub fn request_span<B>(req: &axum::http::Request<B>) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        client_ip = tracing::field::Empty,
    )
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ip = client_ip(
        req.headers(),
        req.extensions(),
        &state.config.server.trusted_proxies,
    );
    Span::current().record("client_ip", ip.as_str());

    if !state.config.rate_limit.enabled {
        return next.run(req).await;
    }

    let allowed = state.limiter.lock().await.check(&ip, Instant::now());
    if !allowed {
        tracing::warn!(target: "security", event = "RATE_LIMITED", client_ip = %ip, "Rate limit exceeded");
        return ApiError::TooManyRequests.into_response();
    }

    next.run(req).await
}

fn is_local_host(host: &str) -> bool {
    let name = host.rsplit_once(':').map_or(host, |(name, _)| name);
    matches!(name, "localhost" | "127.0.0.1" | "[::1]")
}

/// 301 to https when a proxy reports the client spoke plain http.
pub async fn https_redirect(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.config.server.force_https {
        return next.run(req).await;
    }

    let forwarded_http = req
        .headers()
        .get("x-forwarded-proto")
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"http"));
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if forwarded_http && !host.is_empty() && !is_local_host(&host) {
        let path = req
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        if let Ok(location) = HeaderValue::from_str(&format!("https://{host}{path}")) {
            return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
        }
    }

    next.run(req).await
}

/// Keep browsers from caching the front-end shell; API and asset responses
/// are left alone.
pub async fn cache_control(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let no_store =
        path == "/" || !(path.starts_with("/api") || path.starts_with("/assets"));

    let mut resp = next.run(req).await;
    if no_store {
        let headers = resp.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate, max-age=0"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }
    resp
}
