use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, info};

use crate::models::{AppState, BucketSummary, ObjectListing};
use crate::types::AppResult;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buckets", get(list_buckets))
        .route("/buckets/{name}/objects", get(list_objects))
}

#[derive(Debug, Deserialize)]
struct ObjectsQuery {
    #[serde(default)]
    prefix: Option<String>,
}

/// GET /buckets - List every container visible to the service credentials
async fn list_buckets(State(state): State<AppState>) -> AppResult<Json<Vec<BucketSummary>>> {
    info!("Received request for routeKey: GET /buckets");

    let buckets = state.store.list_buckets().await.map_err(|e| {
        error!("Failed to list buckets: {}", e);
        e
    })?;
    Ok(Json(buckets))
}

/// GET /buckets/{name}/objects?prefix= - List folders and files directly under a prefix
async fn list_objects(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ObjectsQuery>,
) -> AppResult<Json<ObjectListing>> {
    info!("Received request for routeKey: GET /buckets/{{bucketName}}/objects");

    let prefix = query.prefix.unwrap_or_default();
    let listing = state.store.list_objects(&name, &prefix).await.map_err(|e| {
        error!("Failed to list objects in {} under '{}': {}", name, prefix, e);
        e
    })?;
    Ok(Json(listing))
}
