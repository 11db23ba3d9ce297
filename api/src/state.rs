use sea_orm::DatabaseConnection;
use shared::StatisticsSettings;
use std::sync::Arc;

use crate::services::{IndicatorService, StatisticsService, UserService, VolatilityService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub indicator_service: Arc<IndicatorService>,
    pub volatility_service: Arc<VolatilityService>,
    pub statistics_service: Arc<StatisticsService>,
    pub user_service: Arc<UserService>,
    pub statistics: StatisticsSettings,
}

impl AppState {
    pub fn new(db: DatabaseConnection, statistics: StatisticsSettings) -> Self {
        let db = Arc::new(db);
        AppState {
            indicator_service: Arc::new(IndicatorService::new(db.clone())),
            volatility_service: Arc::new(VolatilityService::new(db.clone())),
            statistics_service: Arc::new(StatisticsService::new(db.clone())),
            user_service: Arc::new(UserService::new(db.clone())),
            db,
            statistics,
        }
    }
}
