use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{fetch, parse_id, parse_optional_id, with_deadline, ApiError, Pagination};
use crate::calculate::history::{group_match_history, EventHistory};
use crate::calculate::report::{player_kd_report, PlayerKdReport};
use crate::calculate::{kd_ratio, kda_ratio, DisciplineKd};
use crate::models::{MatchStatLine, Player};

const HISTORY_DEFAULT_LIMIT: usize = 50;
const HISTORY_MAX_LIMIT: usize = 100;

pub async fn list_players(State(state): State<AppState>) -> Result<Json<Vec<Player>>, ApiError> {
    tracing::info!(target: "security", event = "API_ACCESS", endpoint = "players");
    let players =
        with_deadline(state.timeouts.standard, "players", fetch("players", state.db.players())).await?;
    Ok(Json(players))
}

async fn require_player(state: &AppState, raw_id: &str) -> Result<Player, ApiError> {
    let id = parse_id(raw_id, "player")?;
    fetch("player", state.db.player(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Player>, ApiError> {
    let player =
        with_deadline(state.timeouts.standard, "player", require_player(&state, &id)).await?;
    Ok(Json(player))
}

/// A stored series row with ratios recomputed from its counts.
#[derive(Debug, Serialize)]
pub struct MatchStatView {
    #[serde(flatten)]
    pub line: MatchStatLine,
    pub kd: f64,
    pub kda: f64,
}

impl From<MatchStatLine> for MatchStatView {
    fn from(line: MatchStatLine) -> Self {
        let s = &line.stat;
        Self {
            kd: kd_ratio(s.total_kills, s.total_deaths),
            kda: kda_ratio(s.total_kills, s.total_assists, s.total_deaths),
            line,
        }
    }
}

pub async fn player_match_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MatchStatView>>, ApiError> {
    let rows = with_deadline(state.timeouts.standard, "player stats", async {
        let player = require_player(&state, &id).await?;
        fetch("player stats", state.db.player_match_stats(player.id)).await
    })
    .await?;
    Ok(Json(rows.into_iter().map(MatchStatView::from).collect()))
}

pub async fn player_kd(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlayerKdReport>, ApiError> {
    with_deadline(state.timeouts.report, "player K/D", async {
        let player = require_player(&state, &id).await?;
        let lines = fetch("player K/D", state.db.player_tournament_lines(player.id)).await?;

        Ok(Json(player_kd_report(
            &player,
            &lines,
            &state.scope,
            state.config.stats.featured_tournament_id,
        )))
    })
    .await
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<String>,
    pub tournament_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchHistoryResponse {
    pub player_id: i64,
    pub events: Vec<EventHistory>,

    /// Series across all events
    pub total: usize,
}

/// Recent series grouped by tournament. The limit selects the most recent
/// series before grouping.
pub async fn player_matches(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<MatchHistoryResponse>, ApiError> {
    with_deadline(state.timeouts.aggregate, "match history", async {
        let player = require_player(&state, &id).await?;
        let tournament_id = parse_optional_id(params.tournament_id.as_deref(), "tournament_id")?;
        let page = Pagination::parse(
            params.limit.as_deref(),
            None,
            HISTORY_DEFAULT_LIMIT,
            HISTORY_MAX_LIMIT,
        );

        let lines = fetch(
            "match history",
            state
                .db
                .player_match_lines(player.id, tournament_id, page.limit as i64),
        )
        .await?;
        let tournaments = fetch("match history", state.db.player_tournament_lines(player.id)).await?;

        let modes: HashMap<i64, DisciplineKd> = tournaments
            .iter()
            .map(|t| (t.stat.tournament_id, DisciplineKd::for_row(&t.stat)))
            .collect();

        Ok(Json(MatchHistoryResponse {
            player_id: player.id,
            total: lines.len(),
            events: group_match_history(&lines, &modes),
        }))
    })
    .await
}

#[cfg(test)]
mod tests {
    use crate::api::routes::test_support::{app, get_json};
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_list_players() {
        let (status, json) = get_json(app().await, "/api/v1/players").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_get_player_not_found() {
        let (status, json) = get_json(app().await, "/api/v1/players/77").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Player not found");
    }

    #[tokio::test]
    async fn test_player_id_validation_on_every_route() {
        for suffix in ["", "/stats", "/kd", "/matches"] {
            for bad in ["abc", "0", "1000001"] {
                let uri = format!("/api/v1/players/{bad}{suffix}");
                let (status, json) = get_json(app().await, &uri).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
                assert_eq!(json["error"], "Invalid player ID");
            }
        }
        let (status, _) = get_json(app().await, "/api/v1/players/1").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_json(app().await, "/api/v1/players/1000000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_match_stats_recompute_ratios() {
        let (status, json) = get_json(app().await, "/api/v1/players/1/stats").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 4);

        // Newest series first; its stored K/D has drifted.
        assert_eq!(rows[0]["match_id"], 5);
        assert_eq!(rows[0]["kd_ratio"], 3.0);
        assert_eq!(rows[0]["kd"], 2.0);
        assert_eq!(rows[0]["kda"], 2.1);
    }

    #[tokio::test]
    async fn test_player_kd_report() {
        let (status, json) = get_json(app().await, "/api/v1/players/1/kd").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["gamertag"], "Simp");
        assert_eq!(json["total_tournaments"], 2);
        assert_eq!(json["season"]["kills"], 30);
        assert_eq!(json["season"]["deaths"], 10);
        assert_eq!(json["season"]["assists"], 7);
        assert_eq!(json["season"]["kd_ratio"], 3.0);
        assert_eq!(json["season"]["kda_ratio"], 3.7);
        assert_eq!(json["season"]["kd_plus_minus"], 2.0);
        assert!(json.get("featured").is_none());
    }

    #[tokio::test]
    async fn test_player_kd_featured_event() {
        let (status, json) = get_json(app().await, "/api/v1/players/5/kd").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["featured"]["tournament_name"], "Esports World Cup");
        assert_eq!(json["featured"]["disciplines"].as_array().unwrap().len(), 3);
        assert_eq!(json["tournaments"][0]["stored_kd_ratio"], 0.5);
        assert_eq!(json["tournaments"][0]["kd_ratio"], 0.9);
    }

    #[tokio::test]
    async fn test_player_matches_grouped_by_event() {
        let (status, json) = get_json(app().await, "/api/v1/players/1/matches").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["player_id"], 1);
        assert_eq!(json["total"], 4);

        let events = json["events"].as_array().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "Major II");
        assert_eq!(events[0]["matches"][0]["result"], "W 3:1");
        assert_eq!(events[0]["matches"][0]["hp_kd"], serde_json::Value::Null);

        let major_one = events[1]["matches"].as_array().unwrap();
        let ids: Vec<i64> = major_one.iter().map(|m| m["match_id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![4, 2, 1]);
        assert_eq!(major_one[1]["result"], "L 2:3");
        assert_eq!(major_one[1]["opponent_abbr"], "TOR");
        assert_eq!(major_one[0]["hp_kd"], 2.0);
    }

    #[tokio::test]
    async fn test_player_matches_filters() {
        let (_, json) = get_json(app().await, "/api/v1/players/1/matches?tournament_id=1").await;
        assert_eq!(json["total"], 3);
        assert_eq!(json["events"].as_array().unwrap().len(), 1);

        let (_, json) = get_json(app().await, "/api/v1/players/1/matches?limit=1").await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["events"][0]["matches"][0]["match_id"], 5);

        let (status, json) =
            get_json(app().await, "/api/v1/players/1/matches?tournament_id=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid tournament_id parameter");
    }
}
