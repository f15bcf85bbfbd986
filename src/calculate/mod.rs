//! Statistics calculation engine.
//!
//! Computes derived metrics from stat rows:
//! - Kill/death and kill/death/assist ratios
//! - Season aggregation and leaderboard ordering
//! - Match history grouping by event
//! - Bracket assembly
//! - Player K/D and team result reports

pub mod bracket;
pub mod history;
pub mod report;
pub mod season;

use std::iter::Sum;
use std::ops::AddAssign;

use serde::Serialize;

use crate::models::{Discipline, PlayerTournamentStat};

/// Kill/death ratio. Zero deaths yields 0.0, never infinity or NaN.
pub fn kd_ratio(kills: i64, deaths: i64) -> f64 {
    if deaths > 0 {
        kills as f64 / deaths as f64
    } else {
        0.0
    }
}

/// (kills + assists) / deaths, with the same zero-death policy as [`kd_ratio`].
pub fn kda_ratio(kills: i64, assists: i64, deaths: i64) -> f64 {
    if deaths > 0 {
        (kills + assists) as f64 / deaths as f64
    } else {
        0.0
    }
}

/// K/D centered on break-even: 0.0 means as many kills as deaths.
pub fn kd_plus_minus(kd: f64) -> f64 {
    kd - 1.0
}

/// Kills per map played, 0.0 when no maps were played.
pub fn kills_per_map(kills: i64, maps: i64) -> f64 {
    if maps > 0 {
        kills as f64 / maps as f64
    } else {
        0.0
    }
}

/// Running kill/death/assist totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KdaTotals {
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
}

impl KdaTotals {
    pub fn new(kills: i64, deaths: i64, assists: i64) -> Self {
        Self {
            kills,
            deaths,
            assists,
        }
    }

    pub fn kd(&self) -> f64 {
        kd_ratio(self.kills, self.deaths)
    }

    pub fn kda(&self) -> f64 {
        kda_ratio(self.kills, self.assists, self.deaths)
    }

    pub fn kd_plus_minus(&self) -> f64 {
        kd_plus_minus(self.kd())
    }

    /// No kills and no deaths recorded.
    pub fn is_blank(&self) -> bool {
        self.kills == 0 && self.deaths == 0
    }
}

impl AddAssign for KdaTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.kills += rhs.kills;
        self.deaths += rhs.deaths;
        self.assists += rhs.assists;
    }
}

impl Sum for KdaTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, t| {
            acc += t;
            acc
        })
    }
}

impl From<&PlayerTournamentStat> for KdaTotals {
    fn from(row: &PlayerTournamentStat) -> Self {
        Self::new(row.total_kills, row.total_deaths, row.total_assists)
    }
}

/// Summed kills/deaths per discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisciplineTotals {
    hardpoint: (i64, i64),
    search_and_destroy: (i64, i64),
    control: (i64, i64),
}

impl DisciplineTotals {
    pub fn add(&mut self, discipline: Discipline, kills: i64, deaths: i64) {
        let slot = match discipline {
            Discipline::Hardpoint => &mut self.hardpoint,
            Discipline::SearchAndDestroy => &mut self.search_and_destroy,
            Discipline::Control => &mut self.control,
        };
        slot.0 += kills;
        slot.1 += deaths;
    }

    pub fn add_row(&mut self, row: &PlayerTournamentStat) {
        for discipline in Discipline::ALL {
            let counts = row.discipline(discipline);
            self.add(discipline, counts.kills, counts.deaths);
        }
    }

    /// Whether any kill or death was recorded in any mode.
    pub fn has_data(&self) -> bool {
        [self.hardpoint, self.search_and_destroy, self.control]
            .iter()
            .any(|(k, d)| *k != 0 || *d != 0)
    }

    pub fn ratios(&self) -> DisciplineKd {
        DisciplineKd {
            hp_kd: kd_ratio(self.hardpoint.0, self.hardpoint.1),
            snd_kd: kd_ratio(self.search_and_destroy.0, self.search_and_destroy.1),
            control_kd: kd_ratio(self.control.0, self.control.1),
        }
    }
}

/// K/D per discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DisciplineKd {
    pub hp_kd: f64,
    pub snd_kd: f64,
    pub control_kd: f64,
}

impl DisciplineKd {
    pub fn for_row(row: &PlayerTournamentStat) -> Self {
        let mut totals = DisciplineTotals::default();
        totals.add_row(row);
        totals.ratios()
    }
}
