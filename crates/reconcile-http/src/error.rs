//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure maps to the same opaque 500 response. The detail is only
//! written to the log.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body returned for every failed request.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("malformed request body: {0}")]
  Malformed(#[from] JsonRejection),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    tracing::error!(error = %self, "request failed");
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "error": GENERIC_ERROR_MESSAGE })),
    )
      .into_response()
  }
}
