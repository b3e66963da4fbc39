//! Request extractors whose rejections render through [`ApiError`], so a
//! malformed query string or body still gets a `{"detail": ...}` reply.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// [`axum::extract::Query`] with a JSON rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// [`axum::Json`] request body with a JSON rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
