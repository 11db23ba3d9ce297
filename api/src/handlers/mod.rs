pub mod indicators;
pub mod statistics;
pub mod users;
pub mod volatilities;

use axum::{extract::State, http::Uri};
use serde::Serialize;
use tracing::warn;

use crate::error::AppError;
use crate::response::{ok, Envelope};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}

/// # GET /health
pub async fn health_check(State(state): State<AppState>) -> Envelope<HealthResponse> {
    let database = match state.db.ping().await {
        Ok(()) => "up",
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            "down"
        }
    };
    ok(
        HealthResponse {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            database,
        },
        "Service is running",
    )
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Route {} not found", uri.path()))
}
