//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Admin Basic-auth failure; the response carries a challenge.
  #[error("unauthorized")]
  Unauthorized,
  /// Missing or stale organizer bearer token.
  #[error("session required")]
  SessionRequired,
  #[error("not found")]
  NotFound,
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("csv error: {0}")]
  Csv(#[from] rollcall_csv::Error),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "unauthorized" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"rollcall-admin\""),
        );
        res
      }
      Error::SessionRequired => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "session required" })),
      )
        .into_response(),
      Error::NotFound => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
          .into_response()
      }
      Error::Conflict(msg) => {
        (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
      }
      Error::BadRequest(msg) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
      }
      Error::Csv(e) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
      Error::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
