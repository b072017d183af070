use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Error taxonomy for everything this service produces itself. Gateway
/// rejections are not in here: their status and body are mirrored verbatim
/// by the payment handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// The gateway could not be reached or answered garbage. The true outcome
    /// of the charge is unknown; callers must not assume failure.
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid signature")]
    Signature,

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Signature => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::AmountOutOfRange(_) => AppError::Validation(err.to_string()),
            _ => AppError::Network(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Same envelope the gateway uses, so frontends parse one shape.
        let body = Json(json!({
            "status": false,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let error = AppError::Validation("invalid amount".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn network_maps_to_internal_server_error() {
        let error = AppError::Network("connection timed out".to_string());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn signature_maps_to_bad_request() {
        assert_eq!(AppError::Signature.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn persistence_maps_to_internal_server_error() {
        let error = AppError::Persistence(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let error = AppError::NotFound("receipt abc123".to_string());
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.to_string(), "receipt abc123 not found");
    }

    #[tokio::test]
    async fn response_carries_gateway_style_envelope() {
        let response = AppError::Validation("email and amount required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
