//! Read-only data consistency diagnostic.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::routes::unix_timestamp;
use crate::api::state::AppState;
use crate::api::{fetch, with_deadline, ApiError};
use crate::db::ValidationReport;

#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub timestamp: i64,
    pub healthy: bool,
    pub issues: Vec<String>,
    pub report: ValidationReport,
}

pub async fn validation(
    State(state): State<AppState>,
) -> Result<Json<ValidationResponse>, ApiError> {
    tracing::info!(target: "security", event = "API_ACCESS", endpoint = "debug/validation");
    let report = with_deadline(
        state.timeouts.report,
        "validation report",
        fetch("validation report", state.db.validate()),
    )
    .await?;

    Ok(Json(ValidationResponse {
        timestamp: unix_timestamp(),
        healthy: report.is_clean(),
        issues: report.issues(),
        report,
    }))
}
