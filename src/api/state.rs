use std::sync::Arc;

use crate::api::rate_limit::{FixedWindowLimiter, SharedLimiter};
use crate::calculate::season::SeasonScope;
use crate::config::{AppConfig, QueryTimeouts};
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub scope: Arc<SeasonScope>,
    pub timeouts: QueryTimeouts,
    pub limiter: SharedLimiter,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let limiter = FixedWindowLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window(),
        );
        Self {
            db,
            scope: Arc::new(SeasonScope::from_config(&config.stats)),
            timeouts: config.server.timeouts(),
            config: Arc::new(config),
            limiter: Arc::new(tokio::sync::Mutex::new(limiter)),
        }
    }
}
