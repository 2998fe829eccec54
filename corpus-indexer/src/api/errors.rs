//! Error responses for the query API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use corpus_indexer_repository::IndexError;

/// Errors returned by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No document with the requested id.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Error from the index.
    #[error(transparent)]
    Index(#[from] IndexError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Index(IndexError::InvalidQuery(_)) => StatusCode::BAD_REQUEST,
            Self::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        (status, Json(json!({ "status": "error", "msg": self.to_string() }))).into_response()
    }
}
