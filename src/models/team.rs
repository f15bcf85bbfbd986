//! Team model.

use serde::{Deserialize, Serialize};

/// A franchise competing in the league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: i64,

    /// Full display name
    pub name: String,

    /// Short code shown in tables (e.g. "OPTX")
    pub abbreviation: String,

    pub city: Option<String>,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,

    /// Inactive teams are hidden from the team listing
    pub is_active: bool,
}
