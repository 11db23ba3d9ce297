use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use sea_orm::{QueryOrder, Select, TransactionTrait};
use shared::entity::{economic_indicators, volatility_data};
use shared::{IndicatorFilter, NewIndicator, NewVolatilitySample};
use std::sync::Arc;

#[derive(Clone)]
pub struct IndicatorRepository {
    db: Arc<DatabaseConnection>,
}

impl IndicatorRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn filtered(filter: &IndicatorFilter) -> Select<economic_indicators::Entity> {
        let mut query = economic_indicators::Entity::find();
        if let Some(country) = &filter.country {
            query = query.filter(economic_indicators::Column::Country.eq(country.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(economic_indicators::Column::ReleasedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(economic_indicators::Column::ReleasedAt.lte(to));
        }
        if let Some(impact) = filter.impact {
            query = query.filter(economic_indicators::Column::Impact.eq(impact.as_str()));
        }
        query
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<economic_indicators::Model>, DbErr> {
        economic_indicators::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
    }

    pub async fn exists(&self, id: i64) -> Result<bool, DbErr> {
        let count = economic_indicators::Entity::find_by_id(id)
            .count(self.db.as_ref())
            .await?;
        Ok(count > 0)
    }

    /// Newest release first.
    pub async fn list(&self, filter: &IndicatorFilter) -> Result<Vec<economic_indicators::Model>, DbErr> {
        Self::filtered(filter)
            .order_by_desc(economic_indicators::Column::ReleasedAt)
            .order_by_desc(economic_indicators::Column::Id)
            .all(self.db.as_ref())
            .await
    }

    pub async fn list_with_samples(
        &self,
        filter: &IndicatorFilter,
    ) -> Result<Vec<(economic_indicators::Model, Vec<volatility_data::Model>)>, DbErr> {
        Self::filtered(filter)
            .find_with_related(volatility_data::Entity)
            .all(self.db.as_ref())
            .await
    }

    /// Inserts the indicator and its initial samples in one transaction.
    pub async fn insert_with_samples(
        &self,
        indicator: NewIndicator,
        samples: Vec<NewVolatilitySample>,
        now: DateTime<Utc>,
    ) -> Result<(economic_indicators::Model, Vec<volatility_data::Model>), DbErr> {
        let txn = self.db.begin().await?;

        let inserted = indicator.into_active_model(None, now).insert(&txn).await?;
        let mut inserted_samples = Vec::with_capacity(samples.len());
        for sample in samples {
            let owned = NewVolatilitySample {
                indicator_id: inserted.id,
                ..sample
            };
            inserted_samples.push(owned.into_active_model(None, now).insert(&txn).await?);
        }

        txn.commit().await?;
        Ok((inserted, inserted_samples))
    }

    pub async fn update(
        &self,
        id: i64,
        indicator: NewIndicator,
        now: DateTime<Utc>,
    ) -> Result<economic_indicators::Model, DbErr> {
        indicator
            .into_active_model(Some(id), now)
            .update(self.db.as_ref())
            .await
    }

    /// Deletes the samples and then the indicator in one transaction, so the
    /// cascade holds even where the store does not enforce foreign keys.
    /// Returns the number of samples removed, or `None` if nothing matched.
    pub async fn delete_cascade(&self, id: i64) -> Result<Option<u64>, DbErr> {
        let txn = self.db.begin().await?;

        let samples = volatility_data::Entity::delete_many()
            .filter(volatility_data::Column::IndicatorId.eq(id))
            .exec(&txn)
            .await?;
        let deleted = economic_indicators::Entity::delete_by_id(id)
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        txn.commit().await?;
        Ok(Some(samples.rows_affected))
    }
}
