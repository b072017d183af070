use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::db::queries;
use crate::error::AppError;
use crate::AppState;

/// `GET /receipt/:id`. Unknown tokens 404 without revealing whether the
/// token was ever issued.
pub async fn get_receipt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = queries::get_receipt(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("receipt {id}")))?;

    Ok(Json(json!({ "receipt": receipt })))
}
