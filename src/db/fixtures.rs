//! In-memory league database for tests.
//!
//! Season allow-list in the default config is {1,2,3,4,5,7}; tournament 6
//! is outside it. Crimsix is on the default denylist.
//!
//! Season K/D, in order: Simp 3.0, Dashy 1.5, Shotzzy 1.5, aBeZy 1.2,
//! CleanX 0.9.

use sqlx::sqlite::SqlitePoolOptions;

use super::Database;

const SEED: &str = r#"
INSERT INTO seasons (id, name, game_title, start_date, is_active) VALUES
    (1, 'CDL 2024', 'Modern Warfare III', '2023-12-01', 1);

INSERT INTO teams (id, name, abbreviation, city, logo_url, is_active) VALUES
    (1, 'Atlanta FaZe', 'ATL', 'Atlanta', 'https://cdn.example/atl.png', 1),
    (2, 'OpTic Texas', 'OPTX', 'Dallas', NULL, 1),
    (3, 'Toronto Ultra', 'TOR', 'Toronto', NULL, 1),
    (4, 'London Royal Ravens', 'LDN', 'London', NULL, 0);

INSERT INTO players (id, gamertag, country, role, is_active, avatar_url) VALUES
    (1, 'Simp', 'US', 'SMG', 1, 'https://cdn.example/simp.png'),
    (2, 'aBeZy', 'US', 'SMG', 1, NULL),
    (3, 'Shotzzy', 'US', 'SMG', 1, NULL),
    (4, 'Dashy', 'CA', 'AR', 1, NULL),
    (5, 'CleanX', 'DK', 'Flex', 1, NULL),
    (6, 'Crimsix', 'US', 'Coach', 1, NULL);

INSERT INTO team_rosters (team_id, player_id, season_id, start_date, end_date) VALUES
    (1, 1, 1, '2023-12-01', NULL),
    (1, 2, 1, '2023-12-01', NULL),
    (2, 3, 1, '2023-12-01', NULL),
    (2, 4, 1, '2023-11-01', NULL),
    (1, 4, NULL, '2022-01-01', '2023-10-31'),
    (3, 5, 1, '2023-10-15', NULL);

INSERT INTO tournaments (id, season_id, name, tournament_type, start_date, end_date, prize_pool) VALUES
    (1, 1, 'Major I', 'major', '2024-01-10', '2024-01-15', 500000),
    (2, 1, 'Major II', 'major', '2024-03-10', '2024-03-17', 500000),
    (6, 1, 'Challengers Cup', 'challengers', '2024-04-01', '2024-04-03', 25000),
    (7, 1, 'Esports World Cup', 'international', '2024-07-01', '2024-07-07', 1000000);

INSERT INTO matches (id, tournament_id, team1_id, team2_id, match_date, format,
                     team1_score, team2_score, winner_id, bracket_round, bracket_position) VALUES
    (1, 1, 1, 2, '2024-01-12 18:00:00', 'Bo5', 3, 1, 1, 'winners_r1', 2),
    (2, 1, 1, 3, '2024-01-13 18:00:00', 'Bo5', 2, 3, 3, 'winners_r1', 1),
    (3, 1, 2, 3, '2024-01-14 18:00:00', 'Bo5', 3, 0, 2, 'exhibition', 1),
    (4, 1, 1, 2, '2024-01-15 18:00:00', 'Bo7', 3, 2, 1, 'grand_finals', 1),
    (5, 2, 1, 3, '2024-03-12 18:00:00', 'Bo5', 3, 1, 1, NULL, 0);

INSERT INTO player_match_stats (match_id, player_id, team_id, maps_played,
                                total_kills, total_deaths, total_assists, kd_ratio, kda_ratio) VALUES
    (1, 1, 1, 4, 25, 20, 3, 1.25, 1.4),
    (2, 1, 1, 5, 18, 20, 2, 0.9, 1.0),
    (4, 1, 1, 5, 30, 24, 6, 1.25, 1.5),
    (5, 1, 1, 4, 20, 10, 1, 3.0, 2.1),
    (1, 3, 2, 4, 22, 22, 4, 1.0, 1.18);

INSERT INTO player_tournament_stats (player_id, team_id, tournament_id,
        total_kills, total_deaths, total_assists, kd_ratio, kda_ratio, overall_maps,
        hp_kills, hp_deaths, snd_kills, snd_deaths, control_kills, control_deaths) VALUES
    (1, 1, 1, 20, 10, 5, 2.0, 2.5, 4, 12, 6, 4, 2, 4, 2),
    (1, 1, 2, 10, 0, 2, 0.0, 0.0, 1, 10, 0, 0, 0, 0, 0),
    (2, 1, 1, 12, 10, 3, 1.2, 1.5, 4, 0, 0, 0, 0, 0, 0),
    (3, 2, 1, 15, 10, 0, 1.5, 1.5, 4, 0, 0, 0, 0, 0, 0),
    (4, 1, 1, 30, 20, 0, 1.5, 1.5, 4, 0, 0, 0, 0, 0, 0),
    (4, 2, 2, 0, 0, 0, 0.0, 0.0, 0, 0, 0, 0, 0, 0, 0),
    (4, 2, 6, 100, 1, 0, 100.0, 100.0, 3, 0, 0, 0, 0, 0, 0),
    (5, 3, 7, 9, 10, 1, 0.5, 1.0, 3, 5, 5, 2, 3, 2, 2),
    (6, 2, 1, 50, 10, 0, 5.0, 5.0, 0, 0, 0, 0, 0, 0, 0);

INSERT INTO team_tournament_stats (tournament_id, team_id, placement, matches_played,
        matches_won, matches_lost, maps_played, maps_won, maps_lost, prize_money) VALUES
    (1, 1, 1, 3, 2, 1, 13, 8, 5, 200000),
    (1, 2, 2, 3, 1, 2, 12, 6, 6, 100000),
    (1, 3, 3, 2, 1, 1, 8, 3, 5, 50000),
    (2, 1, NULL, 1, 1, 0, 4, 3, 1, 0);

INSERT INTO player_transfers (id, player_id, from_team_id, to_team_id, transfer_date,
        transfer_type, season, description) VALUES
    (1, 4, 1, 2, '2023-11-01', 'signing', '2024', 'Dashy joins OpTic Texas'),
    (2, 5, NULL, 3, '2023-10-15', 'signing', '2024', NULL),
    (3, 2, 1, NULL, '2022-08-01', 'release', '2023', NULL);
"#;

/// Empty, migrated database on a single in-memory connection.
pub async fn empty() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let db = Database::new(pool);
    db.migrate().await.expect("migrations apply");
    db
}

/// Migrated database with the league fixture loaded.
pub async fn seeded() -> Database {
    let db = empty().await;
    sqlx::raw_sql(SEED)
        .execute(db.pool())
        .await
        .expect("fixture loads");
    db
}
