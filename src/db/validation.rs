//! Read-only consistency checks over the stat tables.
//!
//! Each check reports the number of offending rows and up to
//! [`SAMPLE_LIMIT`] of them. Nothing here writes.

use serde::Serialize;
use sqlx::{FromRow, QueryBuilder, Sqlite};

use super::{Database, DbError};
use crate::models::BracketRound;

pub const SAMPLE_LIMIT: i64 = 10;

/// Tolerance between a stored ratio and the one recomputed from counts.
pub const KD_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TournamentStatIssue {
    pub id: i64,
    pub player_id: i64,
    pub gamertag: String,
    pub tournament_id: i64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub total_assists: i64,
    pub kd_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MatchStatIssue {
    pub id: i64,
    pub match_id: i64,
    pub player_id: i64,
    pub total_kills: i64,
    pub total_deaths: i64,
    pub kd_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BracketLabelIssue {
    pub match_id: i64,
    pub tournament_id: i64,
    pub bracket_round: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check<T> {
    pub count: i64,
    pub samples: Vec<T>,
}

impl<T> Check<T> {
    pub fn is_clean(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Tournament rows with kills but no deaths
    pub zero_deaths_with_kills: Check<TournamentStatIssue>,

    /// Tournament rows with any negative count
    pub negative_counts: Check<TournamentStatIssue>,

    /// Tournament rows whose stored K/D drifted from kills / deaths
    pub tournament_kd_drift: Check<TournamentStatIssue>,

    /// Series rows whose stored K/D drifted from kills / deaths
    pub match_kd_drift: Check<MatchStatIssue>,

    /// Bracket-tagged series whose label is not a known round
    pub unknown_bracket_rounds: Check<BracketLabelIssue>,
}

impl ValidationReport {
    /// Human-readable summary, one line per failing check.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut note = |count: i64, what: &str| {
            if count > 0 {
                issues.push(format!("Found {count} {what}"));
            }
        };
        note(
            self.zero_deaths_with_kills.count,
            "tournament rows with zero deaths but non-zero kills",
        );
        note(self.negative_counts.count, "tournament rows with negative stats");
        note(
            self.tournament_kd_drift.count,
            "tournament rows with K/D ratio inconsistencies",
        );
        note(
            self.match_kd_drift.count,
            "match rows with K/D ratio inconsistencies",
        );
        note(
            self.unknown_bracket_rounds.count,
            "matches with unrecognized bracket rounds",
        );
        issues
    }

    pub fn is_clean(&self) -> bool {
        self.zero_deaths_with_kills.is_clean()
            && self.negative_counts.is_clean()
            && self.tournament_kd_drift.is_clean()
            && self.match_kd_drift.is_clean()
            && self.unknown_bracket_rounds.is_clean()
    }
}

const TOURNAMENT_ISSUE_SELECT: &str = "SELECT ps.id, ps.player_id, p.gamertag, ps.tournament_id, \
     ps.total_kills, ps.total_deaths, ps.total_assists, ps.kd_ratio \
     FROM player_tournament_stats ps JOIN players p ON p.id = ps.player_id";

const ZERO_DEATHS: &str = "ps.total_deaths = 0 AND ps.total_kills > 0";

const NEGATIVE: &str = "ps.total_kills < 0 OR ps.total_deaths < 0 OR ps.total_assists < 0";

fn drift_predicate(alias: &str) -> String {
    format!(
        "{alias}.total_deaths > 0 AND \
         ABS({alias}.kd_ratio - CAST({alias}.total_kills AS REAL) / {alias}.total_deaths) > {KD_EPSILON}"
    )
}

impl Database {
    async fn tournament_check(&self, predicate: &str) -> Result<Check<TournamentStatIssue>, DbError> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM player_tournament_stats ps WHERE ({predicate})"
        );
        let count: i64 = sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(self.pool()).await?;

        let sample_sql = format!(
            "{TOURNAMENT_ISSUE_SELECT} WHERE ({predicate}) ORDER BY ps.id LIMIT ?"
        );
        let samples = sqlx::query_as::<_, TournamentStatIssue>(&sample_sql)
            .bind(SAMPLE_LIMIT)
            .fetch_all(self.pool())
            .await?;

        Ok(Check { count, samples })
    }

    async fn match_drift_check(&self) -> Result<Check<MatchStatIssue>, DbError> {
        let predicate = drift_predicate("ms");
        let count_sql = format!("SELECT COUNT(*) FROM player_match_stats ms WHERE {predicate}");
        let count: i64 = sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(self.pool()).await?;

        let sample_sql = format!(
            "SELECT ms.id, ms.match_id, ms.player_id, ms.total_kills, ms.total_deaths, ms.kd_ratio \
             FROM player_match_stats ms WHERE {predicate} ORDER BY ms.id LIMIT ?"
        );
        let samples = sqlx::query_as::<_, MatchStatIssue>(&sample_sql)
            .bind(SAMPLE_LIMIT)
            .fetch_all(self.pool())
            .await?;

        Ok(Check { count, samples })
    }

    async fn bracket_label_check(&self) -> Result<Check<BracketLabelIssue>, DbError> {
        fn unknown_labels(qb: &mut QueryBuilder<'_, Sqlite>) {
            qb.push(
                " FROM matches m WHERE m.bracket_round IS NOT NULL \
                  AND m.bracket_round != '' AND m.bracket_round NOT IN (",
            );
            let mut labels = qb.separated(", ");
            for round in BracketRound::ALL {
                labels.push_bind(round.as_str());
            }
            labels.push_unseparated(")");
        }

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        unknown_labels(&mut count_qb);
        let count: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await?;

        let mut sample_qb = QueryBuilder::<Sqlite>::new(
            "SELECT m.id AS match_id, m.tournament_id, m.bracket_round",
        );
        unknown_labels(&mut sample_qb);
        sample_qb.push(" ORDER BY m.id LIMIT ").push_bind(SAMPLE_LIMIT);
        let samples = sample_qb
            .build_query_as::<BracketLabelIssue>()
            .fetch_all(self.pool())
            .await?;

        Ok(Check { count, samples })
    }

    /// Run every consistency check. Read-only.
    pub async fn validate(&self) -> Result<ValidationReport, DbError> {
        Ok(ValidationReport {
            zero_deaths_with_kills: self.tournament_check(ZERO_DEATHS).await?,
            negative_counts: self.tournament_check(NEGATIVE).await?,
            tournament_kd_drift: self.tournament_check(&drift_predicate("ps")).await?,
            match_kd_drift: self.match_drift_check().await?,
            unknown_bracket_rounds: self.bracket_label_check().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::db::fixtures;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_seeded_issues_found() {
        let db = fixtures::seeded().await;
        let report = db.validate().await.unwrap();

        assert_eq!(report.zero_deaths_with_kills.count, 1);
        assert_eq!(report.zero_deaths_with_kills.samples[0].gamertag, "Simp");
        assert_eq!(report.zero_deaths_with_kills.samples[0].tournament_id, 2);

        assert!(report.negative_counts.is_clean());

        assert_eq!(report.tournament_kd_drift.count, 1);
        assert_eq!(report.tournament_kd_drift.samples[0].gamertag, "CleanX");

        assert_eq!(report.match_kd_drift.count, 1);
        assert_eq!(report.match_kd_drift.samples[0].match_id, 5);

        assert_eq!(report.unknown_bracket_rounds.count, 1);
        assert_eq!(
            report.unknown_bracket_rounds.samples[0].bracket_round,
            "exhibition"
        );

        assert!(!report.is_clean());
        assert_eq!(report.issues().len(), 4);
    }

    #[tokio::test]
    async fn test_empty_database_is_clean() {
        let db = fixtures::empty().await;
        let report = db.validate().await.unwrap();
        assert!(report.is_clean());
        assert!(report.issues().is_empty());
    }

    #[tokio::test]
    async fn test_samples_capped() {
        let db = fixtures::empty().await;
        sqlx::raw_sql(
            "INSERT INTO players (id, gamertag) VALUES (1, 'Neg'); \
             INSERT INTO tournaments (id, name, start_date) VALUES \
                 (1, 'A', '2024-01-01'), (2, 'B', '2024-01-02'), (3, 'C', '2024-01-03'), \
                 (4, 'D', '2024-01-04'), (5, 'E', '2024-01-05'), (6, 'F', '2024-01-06'), \
                 (7, 'G', '2024-01-07'), (8, 'H', '2024-01-08'), (9, 'I', '2024-01-09'), \
                 (10, 'J', '2024-01-10'), (11, 'K', '2024-01-11'), (12, 'L', '2024-01-12'); \
             INSERT INTO player_tournament_stats (player_id, tournament_id, total_kills) \
                 SELECT 1, id, -1 FROM tournaments;",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let report = db.validate().await.unwrap();
        assert_eq!(report.negative_counts.count, 12);
        assert_eq!(report.negative_counts.samples.len(), 10);
    }
}
