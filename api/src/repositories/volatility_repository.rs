use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::QueryOrder;
use shared::entity::volatility_data;
use shared::NewVolatilitySample;
use std::sync::Arc;

#[derive(Clone)]
pub struct VolatilityRepository {
    db: Arc<DatabaseConnection>,
}

impl VolatilityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<volatility_data::Model>, DbErr> {
        volatility_data::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
    }

    /// Samples of one indicator, earliest window first.
    pub async fn list_for_indicator(&self, indicator_id: i64) -> Result<Vec<volatility_data::Model>, DbErr> {
        volatility_data::Entity::find()
            .filter(volatility_data::Column::IndicatorId.eq(indicator_id))
            .order_by_asc(volatility_data::Column::PeriodStart)
            .order_by_asc(volatility_data::Column::Id)
            .all(self.db.as_ref())
            .await
    }

    pub async fn insert(
        &self,
        sample: NewVolatilitySample,
        now: DateTime<Utc>,
    ) -> Result<volatility_data::Model, DbErr> {
        sample
            .into_active_model(None, now)
            .insert(self.db.as_ref())
            .await
    }

    pub async fn update(
        &self,
        id: i64,
        sample: NewVolatilitySample,
        now: DateTime<Utc>,
    ) -> Result<volatility_data::Model, DbErr> {
        sample
            .into_active_model(Some(id), now)
            .update(self.db.as_ref())
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<u64, DbErr> {
        let result = volatility_data::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
