use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::gateway::GatewayResult;
use crate::AppState;

/// `POST /pay/initiate` with `{email, amount}`. The gateway's response body
/// and status are passed through untouched so browser checkout code sees
/// exactly what Paystack said.
pub async fn initiate(
    State(state): State<AppState>,
    payload: Option<Json<Value>>,
) -> Result<Response, AppError> {
    let payload = payload.map(|Json(value)| value).unwrap_or_else(|| json!({}));
    let email = payload["email"].as_str();
    let amount = payload.get("amount");

    let result = state.payments.initiate(email, amount).await?;

    Ok(gateway_response(result))
}

/// `GET /pay/verify/:reference`. Mirrors the gateway's response, with a
/// top-level `receipt_id` added when this call settled the charge.
pub async fn verify(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Response, AppError> {
    let (result, receipt_id) = state.payments.verify(&reference).await?;

    let GatewayResult {
        http_status,
        mut body,
        ..
    } = result;
    if let (Some(id), Some(object)) = (receipt_id, body.as_object_mut()) {
        object.insert("receipt_id".to_string(), Value::String(id));
    }

    Ok((status_from(http_status), Json(body)).into_response())
}

fn gateway_response(result: GatewayResult) -> Response {
    (status_from(result.http_status), Json(result.body)).into_response()
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY)
}
