use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::json;

use crate::db::queries;
use crate::error::AppError;
use crate::render;
use crate::AppState;

const LISTING_LIMIT: i64 = 200;

/// `GET /admin/transactions`: the most recent rows as a plain HTML table.
pub async fn list_transactions(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let transactions = queries::list_recent_transactions(&state.db, LISTING_LIMIT).await?;

    Ok(Html(render::admin_page(&transactions)))
}

/// `POST /admin/clear_pending`: deletes every pending row immediately. There
/// is no confirmation step and no undo.
pub async fn clear_pending(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let deleted = queries::delete_pending_transactions(&state.db).await?;
    tracing::info!(deleted, "cleared pending transactions");

    Ok(Json(json!({ "status": true, "deleted": deleted })))
}
