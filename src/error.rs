use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::{utils::ErrorResponse, weather::openweather::OpenWeatherError};

/// Failures surfaced at the request boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
    #[error("Too many requests, please try again later.")]
    RateLimited,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<OpenWeatherError> for ApiError {
    fn from(err: OpenWeatherError) -> Self {
        match err {
            OpenWeatherError::CityNotFound(_) => ApiError::NotFound("City not found".to_string()),
            OpenWeatherError::Status { status, message } => ApiError::Upstream {
                status: Some(status),
                message,
            },
            other => ApiError::Upstream {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, self);
        }
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RateLimited.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            ApiError::Upstream { status: Some(401), message: "bad key".into() }.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Upstream { status: None, message: "timeout".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        // A non-error upstream status never becomes a success response
        assert_eq!(
            ApiError::Upstream { status: Some(200), message: "odd".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_openweather_error() {
        let err: ApiError = OpenWeatherError::CityNotFound("Atlantis".into()).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "City not found"));

        let err: ApiError = OpenWeatherError::Timeout.into();
        assert!(matches!(err, ApiError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::InvalidInput("Query param ?city= is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "success": false, "error": "Query param ?city= is required" })
        );
    }
}
