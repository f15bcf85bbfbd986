use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::routes::unix_timestamp;
use crate::api::state::AppState;
use crate::api::{fetch, parse_optional_id, sanitize_query_param, with_deadline, ApiError};
use crate::db::TransferFilter;
use crate::models::PlayerTransfer;

#[derive(Debug, Default, Deserialize)]
pub struct TransferParams {
    pub season: Option<String>,
    pub team_id: Option<String>,
    pub player_id: Option<String>,
    #[serde(rename = "type")]
    pub transfer_type: Option<String>,
}

impl TransferParams {
    fn into_filter(self) -> Result<TransferFilter, ApiError> {
        let text = |v: Option<String>| {
            v.map(|s| sanitize_query_param(&s))
                .filter(|s| !s.is_empty())
        };
        Ok(TransferFilter {
            team_id: parse_optional_id(self.team_id.as_deref(), "team_id")?,
            player_id: parse_optional_id(self.player_id.as_deref(), "player_id")?,
            season: text(self.season),
            transfer_type: text(self.transfer_type),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TransfersResponse {
    pub timestamp: i64,
    pub transfers: Vec<PlayerTransfer>,
    pub count: usize,
}

pub async fn list_transfers(
    State(state): State<AppState>,
    Query(params): Query<TransferParams>,
) -> Result<Json<TransfersResponse>, ApiError> {
    let filter = params.into_filter()?;
    let transfers = with_deadline(
        state.timeouts.standard,
        "transfers",
        fetch("transfers", state.db.transfers(&filter)),
    )
    .await?;

    Ok(Json(TransfersResponse {
        timestamp: unix_timestamp(),
        count: transfers.len(),
        transfers,
    }))
}
