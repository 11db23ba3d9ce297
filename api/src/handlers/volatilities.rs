use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};

use crate::dto::{VolatilityRequest, VolatilityResponse};
use crate::error::AppResult;
use crate::response::{created, ok, Envelope};
use crate::state::AppState;

/// # GET /api/v1/volatilities/indicator/:id
pub async fn list_for_indicator(
    State(state): State<AppState>,
    indicator_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Envelope<Vec<VolatilityResponse>>> {
    let Path(indicator_id) = indicator_id?;
    let samples = state.volatility_service.list_for_indicator(indicator_id).await?;
    let message = format!("Retrieved {} volatility samples", samples.len());
    let data = samples.into_iter().map(VolatilityResponse::from).collect();
    Ok(ok(data, message))
}

/// # GET /api/v1/volatilities/:id
pub async fn get_volatility(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Envelope<VolatilityResponse>> {
    let Path(id) = id?;
    let sample = state.volatility_service.get(id).await?;
    Ok(ok(sample.into(), "Volatility sample retrieved"))
}

/// # POST /api/v1/volatilities
pub async fn create_volatility(
    State(state): State<AppState>,
    payload: Result<Json<VolatilityRequest>, JsonRejection>,
) -> AppResult<Envelope<VolatilityResponse>> {
    let Json(request) = payload?;
    let sample = state.volatility_service.create(request.validate()?).await?;
    Ok(created(sample.into(), "Volatility sample created"))
}

/// # PUT /api/v1/volatilities/:id
pub async fn update_volatility(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VolatilityRequest>, JsonRejection>,
) -> AppResult<Envelope<VolatilityResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let sample = state.volatility_service.update(id, request.validate()?).await?;
    Ok(ok(sample.into(), "Volatility sample updated"))
}

/// # DELETE /api/v1/volatilities/:id
pub async fn delete_volatility(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.volatility_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
