//! Request handlers for the query API.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::{ApiError, AppState};
use corpus_indexer_shared::{SearchRequest, SearchResponse};

/// Body of `GET /api/fields`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListFieldsResponse {
    pub fields: Vec<String>,
}

/// Body of `GET /api/debug/:doc_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DebugDocumentResponse {
    pub id: String,
    pub document: Value,
}

#[instrument(skip(state, request), fields(query = %request.query.query))]
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let response = state.engine.search(&request).await?;

    debug!(
        total_hits = response.total_hits,
        took_ms = response.took_ms,
        "Search completed"
    );
    Ok(Json(response))
}

pub async fn list_fields(
    State(state): State<AppState>,
) -> Result<Json<ListFieldsResponse>, ApiError> {
    let fields = state.engine.fields().await?;
    Ok(Json(ListFieldsResponse { fields }))
}

pub async fn debug_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Result<Json<DebugDocumentResponse>, ApiError> {
    match state.engine.document(&doc_id).await? {
        Some(document) => Ok(Json(DebugDocumentResponse {
            id: doc_id,
            document,
        })),
        None => Err(ApiError::NotFound(doc_id)),
    }
}
