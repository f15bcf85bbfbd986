//! Series stat lines and bracket rows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A raw per-series stat row with the series it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MatchStatLine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stat: super::PlayerMatchStat,

    pub tournament_id: i64,
    pub match_date: NaiveDateTime,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_score: i64,
    pub team2_score: i64,
    pub winner_id: Option<i64>,
}

/// A player's stat line for one series, joined with the series, its
/// tournament and both teams. Input to match-history grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerMatchLine {
    pub match_id: i64,

    /// Team the player represented in this series
    pub team_id: i64,

    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub maps_played: i64,
    pub match_date: NaiveDateTime,
    pub match_type: Option<String>,
    pub format: Option<String>,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_score: i64,
    pub team2_score: i64,
    pub team1_name: String,
    pub team1_abbr: String,
    pub team2_name: String,
    pub team2_abbr: String,
    pub tournament_id: i64,
    pub tournament_name: String,
    pub tournament_start_date: chrono::NaiveDate,
}

/// A bracket-tagged series with both teams' display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BracketMatch {
    pub id: i64,
    pub team1_id: i64,
    pub team2_id: i64,
    pub team1_name: String,
    pub team1_abbr: String,
    pub team1_logo: Option<String>,
    pub team2_name: String,
    pub team2_abbr: String,
    pub team2_logo: Option<String>,
    pub team1_score: i64,
    pub team2_score: i64,
    pub winner_id: Option<i64>,
    pub bracket_round: String,
    pub bracket_position: i64,
    pub match_date: NaiveDateTime,
}
