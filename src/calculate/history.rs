//! Player match history grouped by event.

use std::collections::HashMap;

use chrono::{Datelike, SecondsFormat};
use serde::Serialize;

use super::{kd_ratio, kills_per_map, DisciplineKd};
use crate::models::PlayerMatchLine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl MatchResult {
    pub fn letter(&self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Loss => "L",
        }
    }
}

/// Result from the point of view of `team_id`. The side with the higher map
/// score wins; a level score counts as a loss since series cannot draw.
pub fn outcome_for(team_id: i64, line: &PlayerMatchLine) -> MatchResult {
    let (ours, theirs) = if team_id == line.team1_id {
        (line.team1_score, line.team2_score)
    } else {
        (line.team2_score, line.team1_score)
    };
    if ours > theirs {
        MatchResult::Win
    } else {
        MatchResult::Loss
    }
}

/// One series as shown in the history view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchLine {
    pub match_id: i64,

    /// RFC 3339, UTC
    pub date: String,

    pub opponent: String,
    pub opponent_abbr: String,

    /// Outcome letter plus map score, e.g. "W 3:1"
    pub result: String,

    /// Map score as "team1:team2"
    pub score: String,

    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub kd: f64,

    /// Kills per map
    pub slayer_rating: f64,

    // Tournament-level discipline K/D, absent when the mode has no data
    pub hp_kd: Option<f64>,
    pub snd_kd: Option<f64>,
    pub ctl_kd: Option<f64>,

    #[serde(skip)]
    sort_key: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventHistory {
    pub tournament_id: i64,
    pub event: String,
    pub year: i32,
    pub matches: Vec<MatchLine>,
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

impl MatchLine {
    fn from_line(line: &PlayerMatchLine, modes: Option<&DisciplineKd>) -> Self {
        let result = outcome_for(line.team_id, line);
        let (opponent, opponent_abbr) = if line.team_id == line.team1_id {
            (line.team2_name.clone(), line.team2_abbr.clone())
        } else {
            (line.team1_name.clone(), line.team1_abbr.clone())
        };
        let score = format!("{}:{}", line.team1_score, line.team2_score);

        Self {
            match_id: line.match_id,
            date: line
                .match_date
                .and_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            opponent,
            opponent_abbr,
            result: format!("{} {}", result.letter(), score),
            score,
            kills: line.total_kills,
            deaths: line.total_deaths,
            assists: line.total_assists,
            kd: kd_ratio(line.total_kills, line.total_deaths),
            slayer_rating: kills_per_map(line.total_kills, line.maps_played),
            hp_kd: modes.and_then(|m| positive(m.hp_kd)),
            snd_kd: modes.and_then(|m| positive(m.snd_kd)),
            ctl_kd: modes.and_then(|m| positive(m.control_kd)),
            sort_key: line.match_date,
        }
    }
}

/// Group a player's series by tournament.
///
/// Events are ordered by tournament start year descending, then tournament
/// id descending. Series within an event are ordered newest first.
/// `modes` maps tournament id to the player's discipline K/D there.
pub fn group_match_history(
    lines: &[PlayerMatchLine],
    modes: &HashMap<i64, DisciplineKd>,
) -> Vec<EventHistory> {
    let mut events: HashMap<i64, EventHistory> = HashMap::new();

    for line in lines {
        let event = events
            .entry(line.tournament_id)
            .or_insert_with(|| EventHistory {
                tournament_id: line.tournament_id,
                event: line.tournament_name.clone(),
                year: line.tournament_start_date.year(),
                matches: Vec::new(),
            });
        event
            .matches
            .push(MatchLine::from_line(line, modes.get(&line.tournament_id)));
    }

    let mut events: Vec<EventHistory> = events.into_values().collect();
    events.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then_with(|| b.tournament_id.cmp(&a.tournament_id))
    });
    for event in &mut events {
        event.matches.sort_by(|a, b| {
            b.sort_key
                .cmp(&a.sort_key)
                .then_with(|| b.match_id.cmp(&a.match_id))
        });
    }
    events
}
