//! Player model.

use serde::{Deserialize, Serialize};

/// A competitor (or a staff account that happens to carry stat rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: i64,

    /// In-game display name
    pub gamertag: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// ISO country code
    pub country: Option<String>,

    /// Role on the team (e.g. "AR", "SMG", "Flex")
    pub role: Option<String>,

    pub is_active: bool,
    pub twitter_handle: Option<String>,
    pub avatar_url: Option<String>,
}
