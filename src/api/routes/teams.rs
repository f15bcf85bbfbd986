use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::{fetch, parse_id, with_deadline, ApiError};
use crate::calculate::report::{team_totals, TeamTotals};
use crate::models::{Player, Team, TeamTournamentStat};

pub async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<Team>>, ApiError> {
    tracing::info!(target: "security", event = "API_ACCESS", endpoint = "teams");
    let teams = with_deadline(state.timeouts.standard, "teams", fetch("teams", state.db.teams())).await?;
    Ok(Json(teams))
}

async fn require_team(state: &AppState, raw_id: &str) -> Result<Team, ApiError> {
    let id = parse_id(raw_id, "team")?;
    fetch("team", state.db.team(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team = with_deadline(state.timeouts.standard, "team", require_team(&state, &id)).await?;
    Ok(Json(team))
}

/// Current roster.
pub async fn team_players(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Player>>, ApiError> {
    let players = with_deadline(state.timeouts.standard, "team players", async {
        let team = require_team(&state, &id).await?;
        fetch("team players", state.db.current_roster(team.id)).await
    })
    .await?;
    Ok(Json(players))
}

#[derive(Debug, Serialize)]
pub struct TeamStatsResponse {
    pub team_id: i64,
    pub team_name: String,
    pub tournaments: Vec<TeamTournamentStat>,
    pub totals: TeamTotals,
}

pub async fn team_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TeamStatsResponse>, ApiError> {
    with_deadline(state.timeouts.standard, "team stats", async {
        let team = require_team(&state, &id).await?;
        let rows = fetch("team stats", state.db.team_tournament_stats(team.id)).await?;

        Ok(Json(TeamStatsResponse {
            team_id: team.id,
            team_name: team.name,
            totals: team_totals(&rows),
            tournaments: rows,
        }))
    })
    .await
}
