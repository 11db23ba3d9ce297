use axum::{
    extract::{rejection::{JsonRejection, PathRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::dto::{IndicatorDetailResponse, IndicatorQuery, IndicatorRequest, IndicatorResponse};
use crate::error::AppResult;
use crate::response::{created, ok, Envelope};
use crate::state::AppState;

/// # GET /api/v1/indicators
pub async fn list_indicators(
    State(state): State<AppState>,
    query: Result<Query<IndicatorQuery>, QueryRejection>,
) -> AppResult<Envelope<Vec<IndicatorResponse>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let indicators = state.indicator_service.list(&filter).await?;
    let count = indicators.len();
    let data = indicators.into_iter().map(IndicatorResponse::from).collect();
    Ok(ok(data, format!("Retrieved {} indicators", count)))
}

/// # GET /api/v1/indicators/:id
/// The indicator together with its volatility samples.
pub async fn get_indicator(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Envelope<IndicatorDetailResponse>> {
    let Path(id) = id?;
    let detail = state.indicator_service.get_with_samples(id).await?;
    Ok(ok(detail.into(), "Indicator retrieved"))
}

/// # POST /api/v1/indicators
/// Creates the indicator together with any nested `volatilities`.
pub async fn create_indicator(
    State(state): State<AppState>,
    payload: Result<Json<IndicatorRequest>, JsonRejection>,
) -> AppResult<Envelope<IndicatorDetailResponse>> {
    let Json(request) = payload?;
    let (indicator, samples) = request.validate()?;
    let detail = state.indicator_service.create(indicator, samples).await?;
    Ok(created(detail.into(), "Indicator created"))
}

/// # PUT /api/v1/indicators/:id
pub async fn update_indicator(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<IndicatorRequest>, JsonRejection>,
) -> AppResult<Envelope<IndicatorResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let (indicator, _) = request.validate()?;
    let updated = state.indicator_service.update(id, indicator).await?;
    Ok(ok(updated.into(), "Indicator updated"))
}

/// # DELETE /api/v1/indicators/:id
pub async fn delete_indicator(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.indicator_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
