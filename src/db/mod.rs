//! Relational access.
//!
//! Every query is read-only and every user-supplied value is bound as a
//! parameter. Ratios are never computed here; rows carry raw counts and the
//! `calculate` module derives everything else.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod validation;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::models::{
    BracketMatch, MatchStatLine, Player, PlayerMatchLine, PlayerTransfer, SeasonStatRow, Team,
    TeamStanding, TeamTournamentStat, Tournament, TournamentStatLine,
};

pub use validation::ValidationReport;

/// Storage errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

const TEAM_COLUMNS: &str = "t.id, t.name, t.abbreviation, t.city, t.logo_url, \
     t.primary_color, t.secondary_color, t.is_active";

const PLAYER_COLUMNS: &str = "p.id, p.gamertag, p.first_name, p.last_name, p.country, \
     p.role, p.is_active, p.twitter_handle, p.avatar_url";

const TOURNAMENT_COLUMNS: &str = "tr.id, tr.season_id, s.name AS season_name, tr.name, \
     tr.tournament_type, tr.start_date, tr.end_date, tr.prize_pool, tr.location, \
     tr.tournament_format";

/// Optional filters for the transfer log. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferFilter {
    pub season: Option<String>,
    pub team_id: Option<i64>,
    pub player_id: Option<i64>,
    pub transfer_type: Option<String>,
}

/// Handle to the league database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a bounded pool against the configured database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Database pool ready"
        );
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Migrations applied");
        Ok(())
    }

    // ── Teams ──

    /// Active teams, by name.
    pub async fn teams(&self) -> Result<Vec<Team>, DbError> {
        let sql = format!(
            "SELECT {TEAM_COLUMNS} FROM teams t WHERE t.is_active = 1 ORDER BY t.name, t.id"
        );
        Ok(sqlx::query_as::<_, Team>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn team(&self, id: i64) -> Result<Option<Team>, DbError> {
        let sql = format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE t.id = ?");
        Ok(sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Players holding an open roster membership on the team.
    pub async fn current_roster(&self, team_id: i64) -> Result<Vec<Player>, DbError> {
        let sql = format!(
            "SELECT {PLAYER_COLUMNS} FROM players p \
             JOIN team_rosters r ON r.player_id = p.id \
             WHERE r.team_id = ? AND r.end_date IS NULL \
             ORDER BY p.gamertag, p.id"
        );
        Ok(sqlx::query_as::<_, Player>(&sql)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await?)
    }

    /// The team's tournament rows, newest tournament first.
    pub async fn team_tournament_stats(
        &self,
        team_id: i64,
    ) -> Result<Vec<TeamTournamentStat>, DbError> {
        Ok(sqlx::query_as::<_, TeamTournamentStat>(
            "SELECT ts.id, ts.tournament_id, tr.name AS tournament_name, ts.team_id, \
                    ts.placement, ts.matches_played, ts.matches_won, ts.matches_lost, \
                    ts.maps_played, ts.maps_won, ts.maps_lost, ts.prize_money \
             FROM team_tournament_stats ts \
             JOIN tournaments tr ON tr.id = ts.tournament_id \
             WHERE ts.team_id = ? \
             ORDER BY tr.start_date DESC, ts.tournament_id DESC",
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ── Players ──

    pub async fn players(&self) -> Result<Vec<Player>, DbError> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players p ORDER BY p.id");
        Ok(sqlx::query_as::<_, Player>(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn player(&self, id: i64) -> Result<Option<Player>, DbError> {
        let sql = format!("SELECT {PLAYER_COLUMNS} FROM players p WHERE p.id = ?");
        Ok(sqlx::query_as::<_, Player>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Raw per-series stat rows for a player, newest first.
    pub async fn player_match_stats(&self, player_id: i64) -> Result<Vec<MatchStatLine>, DbError> {
        Ok(sqlx::query_as::<_, MatchStatLine>(
            "SELECT ms.id, ms.match_id, ms.player_id, ms.team_id, ms.maps_played, \
                    ms.total_kills, ms.total_deaths, ms.total_assists, ms.total_damage, \
                    ms.kd_ratio, ms.kda_ratio, \
                    m.tournament_id, m.match_date, m.team1_id, m.team2_id, \
                    m.team1_score, m.team2_score, m.winner_id \
             FROM player_match_stats ms \
             JOIN matches m ON m.id = ms.match_id \
             WHERE ms.player_id = ? \
             ORDER BY m.match_date DESC, m.id DESC",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// A player's tournament rows, oldest tournament first.
    pub async fn player_tournament_lines(
        &self,
        player_id: i64,
    ) -> Result<Vec<TournamentStatLine>, DbError> {
        Ok(sqlx::query_as::<_, TournamentStatLine>(
            "SELECT ps.id, ps.player_id, ps.team_id, ps.tournament_id, \
                    ps.total_kills, ps.total_deaths, ps.total_assists, ps.total_damage, \
                    ps.kd_ratio, ps.kda_ratio, ps.overall_plus_minus, ps.overall_maps, \
                    ps.snd_kills, ps.snd_deaths, ps.snd_plus_minus, ps.snd_first_kills, ps.snd_maps, \
                    ps.hp_kills, ps.hp_deaths, ps.hp_plus_minus, ps.hp_time_ms, ps.hp_maps, \
                    ps.control_kills, ps.control_deaths, ps.control_plus_minus, \
                    ps.control_captures, ps.control_maps, \
                    tr.name AS tournament_name, tr.start_date AS tournament_start_date \
             FROM player_tournament_stats ps \
             JOIN tournaments tr ON tr.id = ps.tournament_id \
             WHERE ps.player_id = ? \
             ORDER BY tr.start_date, ps.tournament_id",
        )
        .bind(player_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Tournament rows for every player in the given tournaments.
    pub async fn season_rows(&self, tournament_ids: &[i64]) -> Result<Vec<SeasonStatRow>, DbError> {
        if tournament_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT ps.player_id, p.gamertag, p.avatar_url, ps.tournament_id, \
                    t.name AS team_name, t.abbreviation AS team_abbr, \
                    ps.total_kills, ps.total_deaths, ps.total_assists, \
                    ps.hp_kills, ps.hp_deaths, ps.snd_kills, ps.snd_deaths, \
                    ps.control_kills, ps.control_deaths \
             FROM player_tournament_stats ps \
             JOIN players p ON p.id = ps.player_id \
             LEFT JOIN teams t ON t.id = ps.team_id \
             WHERE ps.tournament_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in tournament_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY ps.player_id, ps.tournament_id");

        let rows = qb
            .build_query_as::<SeasonStatRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Fetched season rows");
        Ok(rows)
    }

    /// A player's most recent series with both teams and the tournament
    /// joined in, optionally limited to one tournament.
    pub async fn player_match_lines(
        &self,
        player_id: i64,
        tournament_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<PlayerMatchLine>, DbError> {
        Ok(sqlx::query_as::<_, PlayerMatchLine>(
            "SELECT ms.match_id, ms.team_id, ms.total_kills, ms.total_deaths, \
                    ms.total_assists, ms.maps_played, \
                    m.match_date, m.match_type, m.format, m.team1_id, m.team2_id, \
                    m.team1_score, m.team2_score, \
                    t1.name AS team1_name, t1.abbreviation AS team1_abbr, \
                    t2.name AS team2_name, t2.abbreviation AS team2_abbr, \
                    m.tournament_id, tr.name AS tournament_name, \
                    tr.start_date AS tournament_start_date \
             FROM player_match_stats ms \
             JOIN matches m ON m.id = ms.match_id \
             JOIN teams t1 ON t1.id = m.team1_id \
             JOIN teams t2 ON t2.id = m.team2_id \
             JOIN tournaments tr ON tr.id = m.tournament_id \
             WHERE ms.player_id = ? AND (? IS NULL OR m.tournament_id = ?) \
             ORDER BY m.match_date DESC, m.id DESC \
             LIMIT ?",
        )
        .bind(player_id)
        .bind(tournament_id)
        .bind(tournament_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    // ── Tournaments ──

    /// Every tournament with its season name, newest first.
    pub async fn tournaments(&self) -> Result<Vec<Tournament>, DbError> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments tr \
             LEFT JOIN seasons s ON s.id = tr.season_id \
             ORDER BY tr.start_date DESC, tr.id DESC"
        );
        Ok(sqlx::query_as::<_, Tournament>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn tournament(&self, id: i64) -> Result<Option<Tournament>, DbError> {
        let sql = format!(
            "SELECT {TOURNAMENT_COLUMNS} FROM tournaments tr \
             LEFT JOIN seasons s ON s.id = tr.season_id \
             WHERE tr.id = ?"
        );
        Ok(sqlx::query_as::<_, Tournament>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Final standings, placed teams first.
    pub async fn standings(&self, tournament_id: i64) -> Result<Vec<TeamStanding>, DbError> {
        Ok(sqlx::query_as::<_, TeamStanding>(
            "SELECT ts.team_id, t.name AS team_name, t.abbreviation AS team_abbr, \
                    ts.placement, ts.matches_won, ts.matches_lost, \
                    ts.maps_won, ts.maps_lost, ts.prize_money \
             FROM team_tournament_stats ts \
             JOIN teams t ON t.id = ts.team_id \
             WHERE ts.tournament_id = ? \
             ORDER BY ts.placement IS NULL, ts.placement, ts.team_id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Series in the tournament that carry a bracket label.
    pub async fn bracket_matches(&self, tournament_id: i64) -> Result<Vec<BracketMatch>, DbError> {
        Ok(sqlx::query_as::<_, BracketMatch>(
            "SELECT m.id, m.team1_id, m.team2_id, \
                    t1.name AS team1_name, t1.abbreviation AS team1_abbr, t1.logo_url AS team1_logo, \
                    t2.name AS team2_name, t2.abbreviation AS team2_abbr, t2.logo_url AS team2_logo, \
                    m.team1_score, m.team2_score, m.winner_id, \
                    m.bracket_round, m.bracket_position, m.match_date \
             FROM matches m \
             JOIN teams t1 ON t1.id = m.team1_id \
             JOIN teams t2 ON t2.id = m.team2_id \
             WHERE m.tournament_id = ? \
               AND m.bracket_round IS NOT NULL AND m.bracket_round != '' \
             ORDER BY m.bracket_position, m.id",
        )
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?)
    }

    // ── Transfers ──

    /// Transfer log, most recent first.
    pub async fn transfers(&self, filter: &TransferFilter) -> Result<Vec<PlayerTransfer>, DbError> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT x.id, x.player_id, p.gamertag, \
                    x.from_team_id, ft.name AS from_team_name, ft.abbreviation AS from_team_abbr, \
                    x.to_team_id, tt.name AS to_team_name, tt.abbreviation AS to_team_abbr, \
                    x.transfer_date, x.transfer_type, x.role, x.season, x.description \
             FROM player_transfers x \
             JOIN players p ON p.id = x.player_id \
             LEFT JOIN teams ft ON ft.id = x.from_team_id \
             LEFT JOIN teams tt ON tt.id = x.to_team_id \
             WHERE 1 = 1",
        );

        if let Some(season) = filter.season.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND x.season = ").push_bind(season.to_string());
        }
        if let Some(team_id) = filter.team_id {
            qb.push(" AND (x.from_team_id = ")
                .push_bind(team_id)
                .push(" OR x.to_team_id = ")
                .push_bind(team_id)
                .push(")");
        }
        if let Some(player_id) = filter.player_id {
            qb.push(" AND x.player_id = ").push_bind(player_id);
        }
        if let Some(kind) = filter.transfer_type.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND x.transfer_type = ").push_bind(kind.to_string());
        }
        qb.push(" ORDER BY x.transfer_date DESC, x.id DESC");

        Ok(qb
            .build_query_as::<PlayerTransfer>()
            .fetch_all(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_teams_lists_active_only() {
        let db = fixtures::seeded().await;
        let teams = db.teams().await.unwrap();
        let abbrs: Vec<&str> = teams.iter().map(|t| t.abbreviation.as_str()).collect();
        assert_eq!(abbrs, vec!["ATL", "OPTX", "TOR"]);
    }

    #[tokio::test]
    async fn test_current_roster_skips_ended_memberships() {
        let db = fixtures::seeded().await;
        let roster = db.current_roster(1).await.unwrap();
        let tags: Vec<&str> = roster.iter().map(|p| p.gamertag.as_str()).collect();
        assert_eq!(tags, vec!["Simp", "aBeZy"]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_none() {
        let db = fixtures::seeded().await;
        assert!(db.team(999).await.unwrap().is_none());
        assert!(db.player(999).await.unwrap().is_none());
        assert!(db.tournament(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_season_rows_respect_tournament_list() {
        let db = fixtures::seeded().await;
        let rows = db.season_rows(&[2]).await.unwrap();
        let tags: Vec<&str> = rows.iter().map(|r| r.gamertag.as_str()).collect();
        assert_eq!(tags, vec!["Simp", "Dashy"]);
        assert!(rows.iter().all(|r| r.tournament_id == 2));
        assert_eq!(rows[0].team_abbr.as_deref(), Some("ATL"));

        assert!(db.season_rows(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_player_match_lines_filter_and_limit() {
        let db = fixtures::seeded().await;
        let all = db.player_match_lines(1, None, 50).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].match_id, 5);

        let one_event = db.player_match_lines(1, Some(1), 50).await.unwrap();
        assert_eq!(one_event.len(), 3);

        let latest = db.player_match_lines(1, None, 2).await.unwrap();
        let ids: Vec<i64> = latest.iter().map(|l| l.match_id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_tournaments_carry_season_name() {
        let db = fixtures::seeded().await;
        let tournaments = db.tournaments().await.unwrap();
        assert_eq!(tournaments[0].id, 7);
        assert_eq!(tournaments[0].season_name.as_deref(), Some("CDL 2024"));
    }

    #[tokio::test]
    async fn test_standings_order() {
        let db = fixtures::seeded().await;
        let standings = db.standings(1).await.unwrap();
        let placements: Vec<Option<i64>> = standings.iter().map(|s| s.placement).collect();
        assert_eq!(placements, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_bracket_matches_skip_untagged() {
        let db = fixtures::seeded().await;
        let matches = db.bracket_matches(1).await.unwrap();
        assert_eq!(matches.len(), 4);
        assert!(db.bracket_matches(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_filters() {
        let db = fixtures::seeded().await;

        let all = db.transfers(&TransferFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].gamertag, "Dashy");

        let by_team = db
            .transfers(&TransferFilter {
                team_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_team.len(), 2);

        let releases = db
            .transfers(&TransferFilter {
                transfer_type: Some("release".to_string()),
                season: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].to_team_name, None);
    }

    #[tokio::test]
    async fn test_filter_values_are_bound_not_interpolated() {
        let db = fixtures::seeded().await;
        let result = db
            .transfers(&TransferFilter {
                season: Some("2024' OR '1'='1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(result.is_empty());
    }
}
