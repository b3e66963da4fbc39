//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use earshot_core::ReplyError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler. Always rendered as
/// `{"detail": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{}", .0.body_text())]
  Query(#[from] QueryRejection),

  #[error("{}", .0.body_text())]
  Body(#[from] JsonRejection),

  #[error("missing or invalid bearer token")]
  Unauthorized,

  #[error("{0}")]
  NotFound(String),

  #[error("upstream error: {0}")]
  Upstream(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("reply error: {0}")]
  Reply(#[from] ReplyError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Query(rejection) => rejection.status(),
      ApiError::Body(rejection) => rejection.status(),
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Upstream(_) | ApiError::Store(_) | ApiError::Reply(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "detail": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}
