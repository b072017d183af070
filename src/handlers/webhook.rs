use axum::{body::Bytes, extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::AppState;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// `POST /pay/webhook`. The signature covers the raw body bytes, so the body
/// arrives unparsed and JSON decoding happens only after verification.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if !state.verifier.verify(&body, signature) {
        tracing::warn!("rejected webhook delivery with a bad signature");
        return Err(AppError::Signature);
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("invalid json".to_string()))?;

    state.payments.process_webhook_event(&event).await;

    Ok(Json(json!({ "status": "ok" })))
}
