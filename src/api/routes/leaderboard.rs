//! Season K/D listings.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::unix_timestamp;
use crate::api::state::AppState;
use crate::api::{fetch, parse_bool_flag, with_deadline, ApiError, Pagination, PaginationMeta};
use crate::calculate::season::{aggregate_season, PlayerSeason};

const TOP_DEFAULT_LIMIT: usize = 25;
const TOP_MAX_LIMIT: usize = 100;
const ALL_DEFAULT_LIMIT: usize = 100;
const ALL_MAX_LIMIT: usize = 500;

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub include_majors: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub timestamp: i64,
    pub players: Vec<PlayerSeason>,
    #[serde(flatten)]
    pub page: PaginationMeta,
}

async fn leaderboard(
    state: &AppState,
    pagination: Pagination,
    include_majors: bool,
) -> Result<LeaderboardResponse, ApiError> {
    let rows = with_deadline(
        state.timeouts.aggregate,
        "K/D stats",
        fetch("K/D stats", state.db.season_rows(&state.scope.major_ids())),
    )
    .await?;

    let ranked = aggregate_season(&rows, &state.scope, include_majors);
    let players = pagination.slice(&ranked).to_vec();

    Ok(LeaderboardResponse {
        timestamp: unix_timestamp(),
        page: PaginationMeta::new(&pagination, ranked.len(), players.len()),
        players,
    })
}

/// Top players by season K/D.
pub async fn top_kd(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    tracing::info!(target: "security", event = "API_ACCESS", endpoint = "top-kd");
    let pagination = Pagination::parse(
        params.limit.as_deref(),
        params.offset.as_deref(),
        TOP_DEFAULT_LIMIT,
        TOP_MAX_LIMIT,
    );
    Ok(Json(leaderboard(&state, pagination, false).await?))
}

/// Every player's season line, optionally with the per-tournament split.
pub async fn all_kd(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let pagination = Pagination::parse(
        params.limit.as_deref(),
        params.offset.as_deref(),
        ALL_DEFAULT_LIMIT,
        ALL_MAX_LIMIT,
    );
    let include_majors = parse_bool_flag(params.include_majors.as_deref());
    Ok(Json(leaderboard(&state, pagination, include_majors).await?))
}
