use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use sheetlink_core::{BatchUpdateRequest, BatchUpdateResponse};

use crate::error::AppError;
use crate::store::RecordedBatch;
use crate::validate::validate_batch;
use crate::AppState;

const BATCH_UPDATE_SUFFIX: &str = ":batchUpdate";

/// Apply a transaction.
///
/// The real service addresses the method as a suffix of the resource name
/// (`{id}:batchUpdate`), so the whole path segment is captured and split here.
async fn batch_update(
    State(state): State<AppState>,
    Path(target): Path<String>,
    payload: Result<Json<BatchUpdateRequest>, JsonRejection>,
) -> Result<Json<BatchUpdateResponse>, AppError> {
    let spreadsheet_id = target
        .strip_suffix(BATCH_UPDATE_SUFFIX)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::NotFound(target.clone()))?;

    if !state.limiter.try_acquire(spreadsheet_id).await {
        tracing::warn!("Rate limit reached for spreadsheet {}", spreadsheet_id);
        return Err(AppError::RateLimited(spreadsheet_id.to_string()));
    }

    let Json(body) = payload?;
    validate_batch(&body.requests).map_err(AppError::InvalidArgument)?;

    let replies = vec![json!({}); body.requests.len()];
    let sheet = state.store.get_or_create(spreadsheet_id).await;
    let sequence = sheet.write().await.record(body.requests).sequence;
    tracing::debug!(
        "Recorded batch {} with {} requests for spreadsheet {}",
        sequence,
        replies.len(),
        spreadsheet_id
    );

    Ok(Json(BatchUpdateResponse {
        spreadsheet_id: spreadsheet_id.to_string(),
        replies,
    }))
}

/// List the transactions recorded for a spreadsheet
async fn list_batches(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RecordedBatch>>, AppError> {
    let sheet = state
        .store
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("spreadsheet {}", id)))?;
    let batches = sheet.read().await.batches().to_vec();
    Ok(Json(batches))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v4/spreadsheets/{target}", post(batch_update))
        .route("/emulator/spreadsheets/{id}/batches", get(list_batches))
}
