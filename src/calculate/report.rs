//! Per-player and per-team reports built from tournament stat rows.

use serde::Serialize;

use super::season::SeasonScope;
use super::{kd_plus_minus, kills_per_map, DisciplineKd, DisciplineTotals, KdaTotals};
use crate::models::{Discipline, Player, TeamTournamentStat, TournamentStatLine};

/// Kill totals with their derived ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KdSummary {
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub kd_ratio: f64,
    pub kda_ratio: f64,
    pub kd_plus_minus: f64,
}

impl From<KdaTotals> for KdSummary {
    fn from(t: KdaTotals) -> Self {
        let kd = t.kd();
        Self {
            kills: t.kills,
            deaths: t.deaths,
            assists: t.assists,
            kd_ratio: kd,
            kda_ratio: t.kda(),
            kd_plus_minus: kd_plus_minus(kd),
        }
    }
}

/// One tournament in a player's breakdown. Stored ratios are reported next
/// to the recomputed ones so drift is visible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentKdLine {
    pub tournament_id: i64,
    pub tournament_name: String,
    pub in_season: bool,
    pub maps: i64,
    #[serde(flatten)]
    pub summary: KdSummary,
    pub stored_kd_ratio: f64,
    pub stored_kda_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisciplineLine {
    pub discipline: Discipline,
    pub kills: i64,
    pub deaths: i64,
    pub kd_ratio: f64,
    pub plus_minus: i64,
    pub kills_per_map: f64,
    pub maps: i64,
}

/// Full mode-by-mode line for the featured tournament.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedLine {
    pub tournament_id: i64,
    pub tournament_name: String,
    pub disciplines: Vec<DisciplineLine>,
    pub snd_first_kills: i64,
    pub hp_time_ms: i64,
    pub control_captures: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonBlock {
    #[serde(flatten)]
    pub summary: KdSummary,
    pub tournaments_played: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerKdReport {
    pub player_id: i64,
    pub gamertag: String,
    pub avatar_url: Option<String>,
    pub total_tournaments: usize,
    pub total_maps: i64,
    pub career: KdSummary,
    pub season: SeasonBlock,
    pub discipline_kd: DisciplineKd,
    pub tournaments: Vec<TournamentKdLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<FeaturedLine>,
}

fn featured_line(line: &TournamentStatLine) -> FeaturedLine {
    let stat = &line.stat;
    let disciplines = Discipline::ALL
        .into_iter()
        .map(|d| {
            let c = stat.discipline(d);
            DisciplineLine {
                discipline: d,
                kills: c.kills,
                deaths: c.deaths,
                kd_ratio: super::kd_ratio(c.kills, c.deaths),
                plus_minus: c.plus_minus,
                kills_per_map: kills_per_map(c.kills, c.maps),
                maps: c.maps,
            }
        })
        .collect();

    FeaturedLine {
        tournament_id: stat.tournament_id,
        tournament_name: line.tournament_name.clone(),
        disciplines,
        snd_first_kills: stat.snd_first_kills,
        hp_time_ms: stat.hp_time_ms,
        control_captures: stat.control_captures,
    }
}

/// Build a player's K/D report.
///
/// `lines` should be ordered the way the breakdown is to be shown. Career
/// totals cover every row; the season block only rows inside `scope`.
/// Discipline K/D is computed over the whole career.
pub fn player_kd_report(
    player: &Player,
    lines: &[TournamentStatLine],
    scope: &SeasonScope,
    featured_tournament_id: i64,
) -> PlayerKdReport {
    let mut career = KdaTotals::default();
    let mut season = KdaTotals::default();
    let mut season_events = 0;
    let mut disciplines = DisciplineTotals::default();
    let mut total_maps = 0;
    let mut tournaments = Vec::with_capacity(lines.len());

    for line in lines {
        let stat = &line.stat;
        let totals = KdaTotals::from(stat);
        let in_season = scope.counts_tournament(stat.tournament_id);

        career += totals;
        if in_season {
            season += totals;
            season_events += 1;
        }
        disciplines.add_row(stat);
        total_maps += stat.overall_maps;

        tournaments.push(TournamentKdLine {
            tournament_id: stat.tournament_id,
            tournament_name: line.tournament_name.clone(),
            in_season,
            maps: stat.overall_maps,
            summary: totals.into(),
            stored_kd_ratio: stat.kd_ratio,
            stored_kda_ratio: stat.kda_ratio,
        });
    }

    let featured = lines
        .iter()
        .find(|l| l.stat.tournament_id == featured_tournament_id)
        .map(featured_line);

    PlayerKdReport {
        player_id: player.id,
        gamertag: player.gamertag.clone(),
        avatar_url: player.avatar_url.clone(),
        total_tournaments: lines.len(),
        total_maps,
        career: career.into(),
        season: SeasonBlock {
            summary: season.into(),
            tournaments_played: season_events,
        },
        discipline_kd: disciplines.ratios(),
        tournaments,
        featured,
    }
}

/// Summed team results across tournaments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TeamTotals {
    pub tournaments: usize,
    pub matches_played: i64,
    pub matches_won: i64,
    pub matches_lost: i64,
    pub maps_played: i64,
    pub maps_won: i64,
    pub maps_lost: i64,
    pub prize_money: f64,

    /// Series won over series played, 0.0 before any series
    pub match_win_rate: f64,
}

pub fn team_totals(rows: &[TeamTournamentStat]) -> TeamTotals {
    let mut t = rows.iter().fold(TeamTotals::default(), |mut t, r| {
        t.tournaments += 1;
        t.matches_played += r.matches_played;
        t.matches_won += r.matches_won;
        t.matches_lost += r.matches_lost;
        t.maps_played += r.maps_played;
        t.maps_won += r.maps_won;
        t.maps_lost += r.maps_lost;
        t.prize_money += r.prize_money;
        t
    });
    if t.matches_played > 0 {
        t.match_win_rate = t.matches_won as f64 / t.matches_played as f64;
    }
    t
}
