use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};

use crate::dto::{IndicatorStatisticsResponse, StatisticsQuery, VolatilityRankingResponse};
use crate::error::AppResult;
use crate::response::{ok, Envelope};
use crate::state::AppState;

/// # GET /api/v1/statistics/indicator/:id
/// Classifies the indicator's samples into LOW / MEDIUM / HIGH and reports
/// the forecast surprise.
pub async fn indicator_statistics(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> AppResult<Envelope<IndicatorStatisticsResponse>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let method = query.method(&state.statistics)?;
    let stats = state.statistics_service.indicator_statistics(id, method).await?;
    Ok(ok(stats.into(), "Indicator statistics calculated"))
}

/// # GET /api/v1/statistics/indicators
/// Ranks recurring events by mean sample volatility.
pub async fn volatility_ranking(
    State(state): State<AppState>,
    query: Result<Query<StatisticsQuery>, QueryRejection>,
) -> AppResult<Envelope<VolatilityRankingResponse>> {
    let Query(query) = query?;
    let method = query.method(&state.statistics)?;
    let filter = query.filter()?;
    let min_samples = query.min_samples(&state.statistics);
    let ranking = state
        .statistics_service
        .indicator_ranking(&filter, min_samples, method)
        .await?;
    let message = format!("Ranked {} events", ranking.events.len());
    Ok(ok(ranking.into(), message))
}
