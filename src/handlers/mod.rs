pub mod admin;
pub mod payments;
pub mod receipts;
pub mod webhook;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

/// Hands the browser checkout widget its publishable key. The secret key
/// never leaves the server.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "public_key": state.config.paystack_public_key }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    // Check database connectivity with SELECT 1 query
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let (status_code, status) = if db_status == "connected" {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(json!({
            "status": status,
            "db": db_status,
        })),
    )
}
