//! Indicator aggregate: an indicator and the samples it owns.

use chrono::Utc;
use sea_orm::DatabaseConnection;
use shared::{Indicator, IndicatorFilter, NewIndicator, NewVolatilitySample, VolatilitySample};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::repositories::{IndicatorRepository, VolatilityRepository};

pub struct IndicatorService {
    repo: IndicatorRepository,
    volatility_repo: VolatilityRepository,
}

impl IndicatorService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repo: IndicatorRepository::new(db.clone()),
            volatility_repo: VolatilityRepository::new(db),
        }
    }

    pub async fn list(&self, filter: &IndicatorFilter) -> AppResult<Vec<Indicator>> {
        let models = self.repo.list(filter).await?;
        let indicators = models
            .into_iter()
            .map(Indicator::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(indicators)
    }

    pub async fn get(&self, id: i64) -> AppResult<Indicator> {
        let model = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Indicator", id))?;
        Ok(Indicator::try_from(model)?)
    }

    pub async fn get_with_samples(&self, id: i64) -> AppResult<(Indicator, Vec<VolatilitySample>)> {
        let indicator = self.get(id).await?;
        let samples = self
            .volatility_repo
            .list_for_indicator(id)
            .await?
            .into_iter()
            .map(VolatilitySample::from)
            .collect();
        Ok((indicator, samples))
    }

    pub async fn create(
        &self,
        indicator: NewIndicator,
        samples: Vec<NewVolatilitySample>,
    ) -> AppResult<(Indicator, Vec<VolatilitySample>)> {
        let (model, sample_models) = self
            .repo
            .insert_with_samples(indicator, samples, Utc::now())
            .await?;
        info!(
            indicator_id = model.id,
            country = %model.country,
            name = %model.name,
            samples = sample_models.len(),
            "Indicator created"
        );

        let indicator = Indicator::try_from(model)?;
        let samples = sample_models.into_iter().map(VolatilitySample::from).collect();
        Ok((indicator, samples))
    }

    /// Full update; samples are left untouched.
    pub async fn update(&self, id: i64, indicator: NewIndicator) -> AppResult<Indicator> {
        if !self.repo.exists(id).await? {
            return Err(AppError::not_found("Indicator", id));
        }
        let model = self.repo.update(id, indicator, Utc::now()).await?;
        info!(indicator_id = id, "Indicator updated");
        Ok(Indicator::try_from(model)?)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        match self.repo.delete_cascade(id).await? {
            Some(samples) => {
                info!(indicator_id = id, samples, "Indicator deleted with its samples");
                Ok(())
            }
            None => Err(AppError::not_found("Indicator", id)),
        }
    }
}
