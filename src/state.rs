use std::sync::Arc;

use mongodb::Database;

use crate::config::AppConfig;
use crate::services::football_api::FootballApiClient;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub api: Arc<FootballApiClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, api: FootballApiClient, config: AppConfig) -> Self {
        AppState {
            db,
            api: Arc::new(api),
            config: Arc::new(config),
        }
    }
}
