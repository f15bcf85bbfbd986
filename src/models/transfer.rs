//! Transfer log model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A player's move between teams, with the team and player names joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerTransfer {
    pub id: i64,
    pub player_id: i64,
    pub gamertag: String,
    pub from_team_id: Option<i64>,
    pub from_team_name: Option<String>,
    pub from_team_abbr: Option<String>,
    pub to_team_id: Option<i64>,
    pub to_team_name: Option<String>,
    pub to_team_abbr: Option<String>,
    pub transfer_date: NaiveDate,

    /// Free-form category such as "signing", "release", "bench"
    pub transfer_type: String,

    pub role: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
}
