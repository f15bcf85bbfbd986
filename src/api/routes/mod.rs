pub mod debug;
pub mod leaderboard;
pub mod players;
pub mod teams;
pub mod tournaments;
pub mod transfers;

/// Seconds since the Unix epoch, stamped on envelope responses.
pub(crate) fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::config::AppConfig;
    use crate::db::fixtures;

    /// Router over the seeded fixture with default configuration.
    pub async fn app() -> Router {
        build_router(AppState::new(fixtures::seeded().await, AppConfig::default()))
    }

    pub async fn app_with(config: AppConfig) -> Router {
        build_router(AppState::new(fixtures::seeded().await, config))
    }

    pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }
}
