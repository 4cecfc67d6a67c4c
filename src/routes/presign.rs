use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use tracing::{error, info};

use crate::models::{AppState, PresignRequest, PresignResponse};
use crate::types::{AppError, AppResult};

pub fn router() -> Router<AppState> {
    Router::new().route("/presign", post(presign))
}

/// POST /presign - Issue a time-limited download URL for one object
///
/// A body that is missing, empty or not JSON is treated the same as one
/// without `bucket`/`key`.
async fn presign(State(state): State<AppState>, body: Bytes) -> AppResult<Json<PresignResponse>> {
    info!("Received request for routeKey: POST /presign");

    let request: PresignRequest = serde_json::from_slice(&body).unwrap_or_default();
    let (bucket, key) = match (non_empty(request.bucket), non_empty(request.key)) {
        (Some(bucket), Some(key)) => (bucket, key),
        _ => return Err(AppError::BadRequest("Bucket and key are required.".to_string())),
    };

    let url = state
        .store
        .presign_get(&bucket, &key, state.config.storage.presign_expiry_secs)
        .await
        .map_err(|e| {
            error!("Failed to presign {}/{}: {}", bucket, key, e);
            e
        })?;
    Ok(Json(PresignResponse { url }))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
