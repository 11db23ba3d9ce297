//! Volatility classification over stored samples.

use sea_orm::DatabaseConnection;
use shared::statistics::{self, Classification, Summary, ThresholdMethod};
use shared::{Indicator, IndicatorFilter, VolatilitySample};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::repositories::{IndicatorRepository, VolatilityRepository};

/// Classification of one indicator's samples. `classification.values` is
/// aligned with `samples`.
#[derive(Debug, Clone)]
pub struct IndicatorStatistics {
    pub indicator: Indicator,
    pub samples: Vec<VolatilitySample>,
    pub classification: Classification,
    pub summary: Summary,
}

/// Mean sample volatility of one recurring event (country + name) across its
/// releases.
#[derive(Debug, Clone, PartialEq)]
pub struct EventVolatility {
    pub country: String,
    pub name: String,
    pub releases: usize,
    pub sample_count: usize,
    pub mean_volatility: f64,
}

/// `classification.values` is aligned with `events`.
#[derive(Debug, Clone)]
pub struct VolatilityRanking {
    pub min_samples: usize,
    pub events: Vec<EventVolatility>,
    pub classification: Classification,
}

pub struct StatisticsService {
    indicator_repo: IndicatorRepository,
    volatility_repo: VolatilityRepository,
}

impl StatisticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            indicator_repo: IndicatorRepository::new(db.clone()),
            volatility_repo: VolatilityRepository::new(db),
        }
    }

    pub async fn indicator_statistics(
        &self,
        indicator_id: i64,
        method: ThresholdMethod,
    ) -> AppResult<IndicatorStatistics> {
        let model = self
            .indicator_repo
            .find_by_id(indicator_id)
            .await?
            .ok_or_else(|| AppError::not_found("Indicator", indicator_id))?;
        let indicator = Indicator::try_from(model)?;

        let samples: Vec<VolatilitySample> = self
            .volatility_repo
            .list_for_indicator(indicator_id)
            .await?
            .into_iter()
            .map(VolatilitySample::from)
            .collect();
        if samples.is_empty() {
            return Err(AppError::BusinessRule(format!(
                "Indicator {} has no volatility samples to classify",
                indicator_id
            )));
        }
        let values: Vec<f64> = samples.iter().map(|s| s.volatility).collect();

        let classification = statistics::classify_with(&values, method)?;
        let summary = statistics::summarize(&values)?;
        debug!(
            indicator_id,
            samples = values.len(),
            low = classification.thresholds.low,
            high = classification.thresholds.high,
            degenerate = classification.degenerate,
            "Classified indicator volatility"
        );

        Ok(IndicatorStatistics {
            indicator,
            samples,
            classification,
            summary,
        })
    }

    /// Groups samples by recurring event, drops events with fewer than
    /// `min_samples` samples and classifies the per-event means.
    pub async fn indicator_ranking(
        &self,
        filter: &IndicatorFilter,
        min_samples: usize,
        method: ThresholdMethod,
    ) -> AppResult<VolatilityRanking> {
        let rows = self.indicator_repo.list_with_samples(filter).await?;

        let mut grouped: BTreeMap<(String, String), (usize, Vec<f64>)> = BTreeMap::new();
        for (indicator, samples) in rows {
            let entry = grouped
                .entry((indicator.country, indicator.name))
                .or_insert_with(|| (0, Vec::new()));
            entry.0 += 1;
            entry.1.extend(samples.iter().map(|s| s.volatility));
        }

        let events: Vec<EventVolatility> = grouped
            .into_iter()
            .filter(|(_, (_, values))| values.len() >= min_samples)
            .map(|((country, name), (releases, values))| EventVolatility {
                country,
                name,
                releases,
                sample_count: values.len(),
                mean_volatility: values.iter().sum::<f64>() / values.len() as f64,
            })
            .collect();

        if events.is_empty() {
            return Err(AppError::BusinessRule(format!(
                "No events with at least {} volatility samples match the filter",
                min_samples
            )));
        }
        let means: Vec<f64> = events.iter().map(|e| e.mean_volatility).collect();
        let classification = statistics::classify_with(&means, method)?;
        info!(
            events = events.len(),
            min_samples,
            degenerate = classification.degenerate,
            "Built volatility ranking"
        );

        Ok(VolatilityRanking {
            min_samples,
            events,
            classification,
        })
    }
}
