//! Guard for the side-effecting scrape endpoint.

use axum::http::{HeaderMap, header};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Who may trigger an ingestion run, and how.
#[derive(Debug)]
pub struct ScrapePolicy {
  /// Whether `GET /scrape/reddit` is routed at all; `POST` always is.
  pub allow_get: bool,
  /// When set, callers must send `Authorization: Bearer <token>`.
  pub token:     Option<SecretString>,
}

impl Default for ScrapePolicy {
  fn default() -> Self { Self { allow_get: true, token: None } }
}

/// Check the bearer token in `headers` against `policy`.
pub fn verify_scrape(headers: &HeaderMap, policy: &ScrapePolicy) -> Result<(), ApiError> {
  let Some(expected) = &policy.token else {
    return Ok(());
  };

  let presented = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;

  if presented.trim() != expected.expose_secret() {
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}
