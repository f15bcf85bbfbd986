//! REST API endpoints.
//!
//! Axum-based, read-only HTTP API over the league database, mounted under
//! `/api/v1`. Non-API paths fall through to the front-end bundle.

pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::future::Future;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::db::DbError;
use crate::models::RecordId;
use state::AppState;

/// API error types.
///
/// The message of every variant is shown to the client, so `Internal`
/// must only ever carry a generic description.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    TooManyRequests,

    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Await a storage call, logging a failure with its detail and surfacing
/// it as a generic "Failed to fetch {what}" error.
pub async fn fetch<T, F>(what: &str, query: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, DbError>>,
{
    query.await.map_err(|e| {
        tracing::error!(target: "security", event = "DB_ERROR", what, error = %e, "Query failed");
        ApiError::Internal(format!("Failed to fetch {what}"))
    })
}

/// Run all of a request's storage work under one deadline.
///
/// Errors from `work` pass through unchanged. Running out of time is
/// logged and surfaces as a generic "Failed to fetch {what}" error.
pub async fn with_deadline<T, F>(limit: Duration, what: &str, work: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(
                target: "security",
                event = "QUERY_TIMEOUT",
                what,
                timeout_ms = limit.as_millis() as u64,
                "Request exceeded its query deadline"
            );
            Err(ApiError::Internal(format!("Failed to fetch {what}")))
        }
    }
}

// ── Parameter parsing ───────────────────────────────────────────

/// Parse a numeric identifier from a path segment or query value.
/// `what` names the entity in the error ("team", "player", ...).
pub fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse::<RecordId>().map(RecordId::get).map_err(|e| {
        let shown: String = raw.chars().take(32).collect();
        tracing::warn!(
            target: "security",
            event = "INVALID_INPUT",
            what,
            value = %shown,
            reason = %e,
            "Rejected identifier"
        );
        ApiError::BadRequest(format!("Invalid {what} ID"))
    })
}

/// Like [`parse_id`] for an optional query filter; blank means absent.
pub fn parse_optional_id(raw: Option<&str>, param: &str) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_id(value, param)
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {param} parameter"))),
    }
}

const SUSPICIOUS_FRAGMENTS: [&str; 6] = [";", "--", "/*", "*/", "xp_", "sp_"];

/// Strip fragments commonly seen in injection attempts from a free-text
/// filter. Values are always bound as parameters regardless.
pub fn sanitize_query_param(raw: &str) -> String {
    let mut value = raw.to_string();
    for fragment in SUSPICIOUS_FRAGMENTS {
        value = value.replace(fragment, "");
    }
    value.trim().to_string()
}

/// Truthy query flag: "1", "true", "yes" or "on", any case.
pub fn parse_bool_flag(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().to_ascii_lowercase())
        .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
}

// ── Pagination ──────────────────────────────────────────────────

/// Offset pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    /// Lenient parse: a missing, malformed or non-positive limit falls back
    /// to `default_limit`, a larger one is clamped to `max_limit`, and a
    /// missing, malformed or negative offset becomes 0.
    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        let limit = limit
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n > 0)
            .map_or(default_limit, |n| (n as u64).min(max_limit as u64) as usize);
        let offset = offset
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|n| *n >= 0)
            .map_or(0, |n| n as usize);
        Self { limit, offset }
    }

    /// The page of `items` this pagination selects.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = start.saturating_add(self.limit).min(items.len());
        &items[start..end]
    }
}

/// Pagination metadata in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Rows in this page
    pub count: usize,

    /// Rows across all pages
    pub total: usize,

    pub limit: usize,
    pub offset: usize,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total: usize, count: usize) -> Self {
        Self {
            count,
            total,
            limit: pagination.limit,
            offset: pagination.offset,
        }
    }
}

// ── Router ──────────────────────────────────────────────────────

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; font-src 'self' data:; \
     connect-src 'self'; frame-ancestors 'none';";

fn api_routes() -> Router<AppState> {
    use routes::{debug, leaderboard, players, teams, tournaments, transfers};

    Router::new()
        .route("/teams", get(teams::list_teams))
        .route("/teams/:id", get(teams::get_team))
        .route("/teams/:id/players", get(teams::team_players))
        .route("/teams/:id/stats", get(teams::team_stats))
        .route("/players", get(players::list_players))
        .route("/players/top-kd", get(leaderboard::top_kd))
        .route("/players/all-kd-stats-tournament", get(leaderboard::all_kd))
        .route("/players/:id", get(players::get_player))
        .route("/players/:id/stats", get(players::player_match_stats))
        .route("/players/:id/kd", get(players::player_kd))
        .route("/players/:id/matches", get(players::player_matches))
        .route("/stats/all-kd-by-tournament", get(leaderboard::all_kd))
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/:id", get(tournaments::get_tournament))
        .route("/tournaments/:id/bracket", get(tournaments::tournament_bracket))
        .route("/transfers", get(transfers::list_transfers))
        .route("/debug/validation", get(debug::validation))
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("API endpoint not found".to_string())
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86_400))
}

/// Build the full application: API routes, static bundle and middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/v1", api_routes())
        .route("/", any(api_not_found))
        .fallback(api_not_found);
    let mut app = Router::new().nest("/api", api);

    app = match &state.config.server.static_dir {
        Some(dir) => app.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => app.fallback(not_found),
    };

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ));

    app.layer(axum::middleware::from_fn(middleware::cache_control))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::https_redirect,
        ))
        .layer(cors_layer(&state.config.server.allowed_origins))
        .layer(security_headers)
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .with_state(state)
}
