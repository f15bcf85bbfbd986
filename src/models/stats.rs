//! Stat row models.
//!
//! These are the raw rows the aggregation layer consumes. Stored ratio
//! columns are a cache of `kills / deaths` and are only reported next to
//! freshly computed values, never trusted on their own.

use serde::{Deserialize, Serialize};

/// Game modes that carry their own kill/death breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Hardpoint,
    SearchAndDestroy,
    Control,
}

impl Discipline {
    pub const ALL: [Discipline; 3] = [
        Discipline::Hardpoint,
        Discipline::SearchAndDestroy,
        Discipline::Control,
    ];

    /// Short prefix used by the stat columns ("hp", "snd", "control").
    pub fn prefix(&self) -> &'static str {
        match self {
            Discipline::Hardpoint => "hp",
            Discipline::SearchAndDestroy => "snd",
            Discipline::Control => "control",
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// One row per (match, player).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerMatchStat {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub team_id: i64,
    pub maps_played: i64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub total_damage: i64,

    /// Stored K/D (may drift from the raw counts)
    pub kd_ratio: f64,

    /// Stored K/D/A (may drift from the raw counts)
    pub kda_ratio: f64,
}

/// One row per (player, tournament), with the per-mode breakdown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerTournamentStat {
    pub id: i64,
    pub player_id: i64,
    pub team_id: Option<i64>,
    pub tournament_id: i64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub total_damage: i64,
    pub kd_ratio: f64,
    pub kda_ratio: f64,
    pub overall_plus_minus: i64,
    pub overall_maps: i64,
    pub snd_kills: i64,
    pub snd_deaths: i64,
    pub snd_plus_minus: i64,
    pub snd_first_kills: i64,
    pub snd_maps: i64,
    pub hp_kills: i64,
    pub hp_deaths: i64,
    pub hp_plus_minus: i64,
    pub hp_time_ms: i64,
    pub hp_maps: i64,
    pub control_kills: i64,
    pub control_deaths: i64,
    pub control_plus_minus: i64,
    pub control_captures: i64,
    pub control_maps: i64,
}

/// Raw per-mode figures pulled out of a tournament row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisciplineCounts {
    pub kills: i64,
    pub deaths: i64,
    pub plus_minus: i64,
    pub maps: i64,
}

impl PlayerTournamentStat {
    pub fn discipline(&self, discipline: Discipline) -> DisciplineCounts {
        match discipline {
            Discipline::Hardpoint => DisciplineCounts {
                kills: self.hp_kills,
                deaths: self.hp_deaths,
                plus_minus: self.hp_plus_minus,
                maps: self.hp_maps,
            },
            Discipline::SearchAndDestroy => DisciplineCounts {
                kills: self.snd_kills,
                deaths: self.snd_deaths,
                plus_minus: self.snd_plus_minus,
                maps: self.snd_maps,
            },
            Discipline::Control => DisciplineCounts {
                kills: self.control_kills,
                deaths: self.control_deaths,
                plus_minus: self.control_plus_minus,
                maps: self.control_maps,
            },
        }
    }
}

/// One row per (team, tournament).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamTournamentStat {
    pub id: i64,
    pub tournament_id: i64,

    /// Tournament name, joined in at query time
    pub tournament_name: String,

    pub team_id: i64,
    pub placement: Option<i64>,
    pub matches_played: i64,
    pub matches_won: i64,
    pub matches_lost: i64,
    pub maps_played: i64,
    pub maps_won: i64,
    pub maps_lost: i64,
    pub prize_money: f64,
}

/// A tournament stat row joined with the player and team it belongs to.
/// Input to season aggregation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct SeasonStatRow {
    pub player_id: i64,
    pub gamertag: String,
    pub avatar_url: Option<String>,
    pub tournament_id: i64,
    pub team_name: Option<String>,
    pub team_abbr: Option<String>,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub hp_kills: i64,
    pub hp_deaths: i64,
    pub snd_kills: i64,
    pub snd_deaths: i64,
    pub control_kills: i64,
    pub control_deaths: i64,
}

/// A tournament stat row with the tournament's name and start date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TournamentStatLine {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub stat: PlayerTournamentStat,

    pub tournament_name: String,
    pub tournament_start_date: chrono::NaiveDate,
}

/// A team's finish in one tournament, for the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamStanding {
    pub team_id: i64,
    pub team_name: String,
    pub team_abbr: String,
    pub placement: Option<i64>,
    pub matches_won: i64,
    pub matches_lost: i64,
    pub maps_won: i64,
    pub maps_lost: i64,
    pub prize_money: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discipline_columns() {
        let row = PlayerTournamentStat {
            hp_kills: 10,
            hp_deaths: 8,
            snd_kills: 5,
            snd_deaths: 6,
            control_kills: 7,
            control_deaths: 7,
            control_maps: 2,
            ..Default::default()
        };
        assert_eq!(row.discipline(Discipline::Hardpoint).kills, 10);
        assert_eq!(row.discipline(Discipline::SearchAndDestroy).deaths, 6);
        assert_eq!(row.discipline(Discipline::Control).maps, 2);
    }

    #[test]
    fn test_discipline_serialization() {
        let json = serde_json::to_string(&Discipline::SearchAndDestroy).unwrap();
        assert_eq!(json, "\"search_and_destroy\"");
        assert_eq!(Discipline::Control.to_string(), "control");
    }
}
