//! Tournament model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tournament ("event") within a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tournament {
    pub id: i64,
    pub season_id: Option<i64>,

    /// Name of the owning season, joined in at query time
    pub season_name: Option<String>,

    pub name: String,
    pub tournament_type: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub prize_pool: Option<f64>,
    pub location: Option<String>,
    pub tournament_format: Option<String>,
}
