//! Season aggregation and K/D leaderboard ordering.
//!
//! A "season" is the union of the designated major tournaments. Which
//! tournaments count and which accounts are left out are both supplied by
//! [`SeasonScope`], so nothing here knows about specific ids or gamertags.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use super::{DisciplineKd, DisciplineTotals, KdaTotals};
use crate::config::StatsConfig;
use crate::models::{Discipline, SeasonStatRow};

/// Which tournaments make up the season and which accounts are not players.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonScope {
    majors: BTreeSet<i64>,
    excluded: HashSet<String>,
}

impl SeasonScope {
    pub fn new(
        majors: impl IntoIterator<Item = i64>,
        excluded: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            majors: majors.into_iter().collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    pub fn from_config(config: &StatsConfig) -> Self {
        Self::new(
            config.major_tournament_ids.iter().copied(),
            config.excluded_gamertags.iter().cloned(),
        )
    }

    /// Tournament ids in ascending order.
    pub fn major_ids(&self) -> Vec<i64> {
        self.majors.iter().copied().collect()
    }

    pub fn counts_tournament(&self, tournament_id: i64) -> bool {
        self.majors.contains(&tournament_id)
    }

    /// Exact, case-sensitive gamertag match against the denylist.
    pub fn excludes(&self, gamertag: &str) -> bool {
        self.excluded.contains(gamertag)
    }
}

/// One tournament's contribution to a player's season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MajorStat {
    pub kd_ratio: f64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
}

impl From<KdaTotals> for MajorStat {
    fn from(t: KdaTotals) -> Self {
        Self {
            kd_ratio: t.kd(),
            kills: t.kills,
            deaths: t.deaths,
            assists: t.assists,
        }
    }
}

/// Season line for one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSeason {
    pub player_id: i64,
    pub gamertag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub team_name: String,
    pub team_abbr: String,
    pub season_kills: i64,
    pub season_deaths: i64,
    pub season_assists: i64,
    pub season_kd: f64,
    pub season_kda: f64,
    pub season_kd_plus_minus: f64,
    pub tournaments_played: usize,
    pub discipline_kd: DisciplineKd,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub majors: Option<BTreeMap<i64, MajorStat>>,
}

#[derive(Debug, Default)]
struct Accumulator {
    gamertag: String,
    avatar_url: Option<String>,
    // (tournament_id, name, abbr) of the latest row seen
    team: Option<(i64, String, String)>,
    totals: KdaTotals,
    disciplines: DisciplineTotals,
    majors: BTreeMap<i64, KdaTotals>,
}

impl Accumulator {
    fn push(&mut self, row: &SeasonStatRow) {
        let line = KdaTotals::new(row.total_kills, row.total_deaths, row.total_assists);
        self.totals += line;
        *self.majors.entry(row.tournament_id).or_default() += line;

        self.disciplines
            .add(Discipline::Hardpoint, row.hp_kills, row.hp_deaths);
        self.disciplines
            .add(Discipline::SearchAndDestroy, row.snd_kills, row.snd_deaths);
        self.disciplines
            .add(Discipline::Control, row.control_kills, row.control_deaths);

        if self.avatar_url.is_none() {
            self.avatar_url = row.avatar_url.clone().filter(|a| !a.is_empty());
        }

        let newer = self
            .team
            .as_ref()
            .map_or(true, |(tid, _, _)| row.tournament_id > *tid);
        if newer {
            if let (Some(name), Some(abbr)) = (&row.team_name, &row.team_abbr) {
                self.team = Some((row.tournament_id, name.clone(), abbr.clone()));
            }
        }
    }

    fn finish(self, player_id: i64, include_majors: bool) -> PlayerSeason {
        let (team_name, team_abbr) = self
            .team
            .map(|(_, name, abbr)| (name, abbr))
            .unwrap_or_default();
        let kd = self.totals.kd();
        PlayerSeason {
            player_id,
            gamertag: self.gamertag,
            avatar_url: self.avatar_url,
            team_name,
            team_abbr,
            season_kills: self.totals.kills,
            season_deaths: self.totals.deaths,
            season_assists: self.totals.assists,
            season_kd: kd,
            season_kda: self.totals.kda(),
            season_kd_plus_minus: super::kd_plus_minus(kd),
            tournaments_played: self.majors.len(),
            discipline_kd: self.disciplines.ratios(),
            majors: include_majors.then(|| {
                self.majors
                    .into_iter()
                    .map(|(tid, t)| (tid, MajorStat::from(t)))
                    .collect()
            }),
        }
    }
}

/// Fold tournament rows into one season line per player.
///
/// Rows outside the scope's tournaments and rows for excluded gamertags are
/// ignored. Players with neither kills nor deaths in the season are dropped.
/// The result is ranked with [`rank_by_kd`].
pub fn aggregate_season(
    rows: &[SeasonStatRow],
    scope: &SeasonScope,
    include_majors: bool,
) -> Vec<PlayerSeason> {
    let mut by_player: BTreeMap<i64, Accumulator> = BTreeMap::new();

    for row in rows {
        if !scope.counts_tournament(row.tournament_id) || scope.excludes(&row.gamertag) {
            continue;
        }
        let acc = by_player
            .entry(row.player_id)
            .or_insert_with(|| Accumulator {
                gamertag: row.gamertag.clone(),
                ..Default::default()
            });
        acc.push(row);
    }

    let mut players: Vec<PlayerSeason> = by_player
        .into_iter()
        .filter(|(_, acc)| !acc.totals.is_blank())
        .map(|(player_id, acc)| acc.finish(player_id, include_majors))
        .collect();

    rank_by_kd(&mut players);
    players
}

/// Leaderboard order: season K/D descending, then gamertag ascending.
pub fn leaderboard_order(a: &PlayerSeason, b: &PlayerSeason) -> Ordering {
    b.season_kd
        .total_cmp(&a.season_kd)
        .then_with(|| a.gamertag.cmp(&b.gamertag))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

pub fn rank_by_kd(players: &mut [PlayerSeason]) {
    players.sort_by(leaderboard_order);
}
