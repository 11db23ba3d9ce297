use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use shared::UserSetting;

use crate::dto::{SettingsRequest, SettingsResponse, UserRequest, UserResponse};
use crate::error::AppResult;
use crate::response::{created, ok, Envelope};
use crate::state::AppState;

fn settings_response(user_id: i64, settings: Vec<UserSetting>) -> SettingsResponse {
    SettingsResponse {
        user_id,
        settings: settings.into_iter().map(|s| (s.key, s.value)).collect(),
    }
}

/// # GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Envelope<Vec<UserResponse>>> {
    let users = state.user_service.list().await?;
    let message = format!("Retrieved {} users", users.len());
    Ok(ok(users.into_iter().map(UserResponse::from).collect(), message))
}

/// # GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Envelope<UserResponse>> {
    let Path(id) = id?;
    let user = state.user_service.get(id).await?;
    Ok(ok(user.into(), "User retrieved"))
}

/// # POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> AppResult<Envelope<UserResponse>> {
    let Json(request) = payload?;
    let user = state.user_service.create(request.validate()?).await?;
    Ok(created(user.into(), "User created"))
}

/// # PUT /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> AppResult<Envelope<UserResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let user = state.user_service.update(id, request.validate()?).await?;
    Ok(ok(user.into(), "User updated"))
}

/// # DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// # GET /api/v1/users/:id/settings
pub async fn get_settings(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Envelope<SettingsResponse>> {
    let Path(id) = id?;
    let settings = state.user_service.settings(id).await?;
    Ok(ok(settings_response(id, settings), "Settings retrieved"))
}

/// # PUT /api/v1/users/:id/settings
/// Replaces the whole settings map.
pub async fn replace_settings(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<SettingsRequest>, JsonRejection>,
) -> AppResult<Envelope<SettingsResponse>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let settings = state.user_service.replace_settings(id, request.validate()?).await?;
    Ok(ok(settings_response(id, settings), "Settings updated"))
}
