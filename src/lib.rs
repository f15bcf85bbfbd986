//! # CDL Stats
//!
//! Read-only statistics API for a competitive esports league.
//!
//! ## Architecture
//!
//! - **models**: Row types for teams, players, tournaments, series and stats
//! - **db**: SQLite access and the data consistency diagnostic
//! - **calculate**: K/D aggregation, match history, brackets and reports
//! - **api**: REST API endpoints and HTTP middleware
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod db;
pub mod models;

pub use models::*;
