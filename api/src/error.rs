use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{MappingError, StatisticsError};
use thiserror::Error;

use crate::response::ApiResponse;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BusinessRule(String),
    #[error(transparent)]
    Statistics(#[from] StatisticsError),
    #[error("Stored record could not be mapped: {0}")]
    Mapping(#[from] MappingError),
    #[error("Database error: {0}")]
    Database(DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(resource: &str, id: i64) -> Self {
        AppError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BusinessRule(_) | AppError::Statistics(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Mapping(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // A concurrent write won the race past the service's uniqueness check.
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            tracing::warn!(%detail, "Unique constraint violated");
            return AppError::Conflict("Resource already exists".to_string());
        }
        match err {
            // The row vanished between the existence check and the write.
            DbErr::RecordNotUpdated => AppError::NotFound("Record no longer exists".to_string()),
            other => AppError::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("body", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid("path", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid("query", rejection.body_text())
    }
}

/// Converts `AppError` into the error envelope. Server-side failures are
/// logged and replaced by a generic message.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, data) = match self {
            AppError::Validation(errors) => (
                "Validation failed".to_string(),
                Some(json!({ "errors": errors })),
            ),
            AppError::Mapping(err) => {
                tracing::error!(error = %err, "Stored value violates a closed enumeration.");
                ("An internal data error occurred".to_string(), None)
            }
            AppError::Database(err) => {
                tracing::error!(error = ?err, "Database error.");
                ("An internal database error occurred".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = ?err, "Unhandled error.");
                ("An internal error occurred".to_string(), None)
            }
            other => (other.to_string(), None),
        };

        (status, Json(ApiResponse::error(message, data))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::not_found("Indicator", 1).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::invalid("name", "required").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Conflict("taken".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(StatisticsError::EmptyInput).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(MappingError::UnknownImpact("X".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(DbErr::RecordNotUpdated).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Volatility sample", 9);
        assert_eq!(err.to_string(), "Volatility sample with id 9 not found");
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        use sea_orm::{ConnectOptions, ConnectionTrait, Database};

        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        db.execute_unprepared("CREATE TABLE accounts (name TEXT NOT NULL UNIQUE)")
            .await
            .unwrap();
        db.execute_unprepared("INSERT INTO accounts (name) VALUES ('analyst')")
            .await
            .unwrap();
        let err = db
            .execute_unprepared("INSERT INTO accounts (name) VALUES ('analyst')")
            .await
            .unwrap_err();

        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::Conflict(_)));
        assert_eq!(app_err.status(), StatusCode::CONFLICT);
    }
}
