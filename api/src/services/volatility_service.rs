use chrono::Utc;
use sea_orm::DatabaseConnection;
use shared::{NewVolatilitySample, VolatilitySample};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::repositories::{IndicatorRepository, VolatilityRepository};

pub struct VolatilityService {
    repo: VolatilityRepository,
    indicator_repo: IndicatorRepository,
}

impl VolatilityService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repo: VolatilityRepository::new(db.clone()),
            indicator_repo: IndicatorRepository::new(db),
        }
    }

    async fn ensure_indicator(&self, indicator_id: i64) -> AppResult<()> {
        if self.indicator_repo.exists(indicator_id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Indicator", indicator_id))
        }
    }

    pub async fn list_for_indicator(&self, indicator_id: i64) -> AppResult<Vec<VolatilitySample>> {
        self.ensure_indicator(indicator_id).await?;
        let samples = self
            .repo
            .list_for_indicator(indicator_id)
            .await?
            .into_iter()
            .map(VolatilitySample::from)
            .collect();
        Ok(samples)
    }

    pub async fn get(&self, id: i64) -> AppResult<VolatilitySample> {
        self.repo
            .find_by_id(id)
            .await?
            .map(VolatilitySample::from)
            .ok_or_else(|| AppError::not_found("Volatility sample", id))
    }

    pub async fn create(&self, sample: NewVolatilitySample) -> AppResult<VolatilitySample> {
        self.ensure_indicator(sample.indicator_id).await?;
        let model = self.repo.insert(sample, Utc::now()).await?;
        info!(sample_id = model.id, indicator_id = model.indicator_id, "Volatility sample created");
        Ok(model.into())
    }

    /// Full update; the sample may be moved to another existing indicator.
    pub async fn update(&self, id: i64, sample: NewVolatilitySample) -> AppResult<VolatilitySample> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::not_found("Volatility sample", id));
        }
        self.ensure_indicator(sample.indicator_id).await?;
        let model = self.repo.update(id, sample, Utc::now()).await?;
        info!(sample_id = id, "Volatility sample updated");
        Ok(model.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.repo.delete(id).await? == 0 {
            return Err(AppError::not_found("Volatility sample", id));
        }
        info!(sample_id = id, "Volatility sample deleted");
        Ok(())
    }
}
