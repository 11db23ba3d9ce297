//! Uniform response envelope: `{status, data, message, timestamp}`.

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub data: Option<T>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<Value> {
    pub fn error(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

pub type Envelope<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn ok<T>(data: T, message: impl Into<String>) -> Envelope<T> {
    (StatusCode::OK, Json(ApiResponse::success(data, message)))
}

pub fn created<T>(data: T, message: impl Into<String>) -> Envelope<T> {
    (StatusCode::CREATED, Json(ApiResponse::success(data, message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let (status, Json(body)) = ok(vec![1, 2], "Fetched");
        assert_eq!(status, StatusCode::OK);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["data"], serde_json::json!([1, 2]));
        assert_eq!(value["message"], "Fetched");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_error_envelope_has_null_data() {
        let value = serde_json::to_value(ApiResponse::error("Missing", None)).unwrap();
        assert_eq!(value["status"], "error");
        assert!(value["data"].is_null());
    }
}
