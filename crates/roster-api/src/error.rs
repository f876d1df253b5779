//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Directory(#[from] roster_core::Error),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Directory(roster_core::Error::InvalidStudent(_)) => {
        StatusCode::UNPROCESSABLE_ENTITY
      }
      ApiError::Directory(roster_core::Error::DuplicateEmail(_)) => StatusCode::CONFLICT,
      ApiError::Directory(roster_core::Error::Persistence(e)) => {
        tracing::error!(error = %e, "request failed on storage");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
