//! HTTP query API.
//!
//! Routes:
//! - `POST /api/search` - Run a query string search
//! - `GET /api/fields` - List known document fields
//! - `GET /api/debug/:doc_id` - Show the stored document for an id

mod errors;
mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use corpus_indexer_repository::IndexEngine;

pub use errors::ApiError;
pub use handlers::{DebugDocumentResponse, ListFieldsResponse};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn IndexEngine>,
}

/// Build the API router over the given index.
pub fn router(engine: Arc<dyn IndexEngine>) -> Router {
    Router::new()
        .route("/api/search", post(handlers::search))
        .route("/api/fields", get(handlers::list_fields))
        .route("/api/debug/:doc_id", get(handlers::debug_document))
        .with_state(AppState { engine })
}
