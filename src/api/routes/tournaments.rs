use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::api::state::AppState;
use crate::api::{fetch, parse_id, with_deadline, ApiError};
use crate::calculate::bracket::{assemble_bracket, Bracket};
use crate::models::{TeamStanding, Tournament};

pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    tracing::info!(target: "security", event = "API_ACCESS", endpoint = "tournaments");
    let tournaments = with_deadline(
        state.timeouts.standard,
        "tournaments",
        fetch("tournaments", state.db.tournaments()),
    )
    .await?;
    Ok(Json(tournaments))
}

async fn require_tournament(state: &AppState, raw_id: &str) -> Result<Tournament, ApiError> {
    let id = parse_id(raw_id, "tournament")?;
    fetch("tournament", state.db.tournament(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Tournament not found".to_string()))
}

#[derive(Debug, Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub standings: Vec<TeamStanding>,
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TournamentDetail>, ApiError> {
    with_deadline(state.timeouts.standard, "tournament standings", async {
        let tournament = require_tournament(&state, &id).await?;
        let standings = fetch("tournament standings", state.db.standings(tournament.id)).await?;
        Ok(Json(TournamentDetail {
            tournament,
            standings,
        }))
    })
    .await
}

#[derive(Debug, Serialize)]
pub struct BracketResponse {
    pub tournament_id: i64,
    pub tournament_name: String,
    pub bracket: Bracket,
    pub total_matches: usize,
}

pub async fn tournament_bracket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BracketResponse>, ApiError> {
    let (tournament, matches) = with_deadline(state.timeouts.standard, "bracket", async {
        let tournament = require_tournament(&state, &id).await?;
        let matches = fetch("bracket", state.db.bracket_matches(tournament.id)).await?;
        Ok((tournament, matches))
    })
    .await?;

    let assembly = assemble_bracket(matches);
    for dropped in &assembly.dropped {
        warn!(
            tournament_id = tournament.id,
            match_id = dropped.match_id,
            label = %dropped.label,
            "Series has an unknown bracket round; left out of bracket"
        );
    }

    Ok(Json(BracketResponse {
        tournament_id: tournament.id,
        tournament_name: tournament.name,
        total_matches: assembly.placed,
        bracket: assembly.bracket,
    }))
}
