//! Handler for `GET|POST /scrape/reddit`.
//!
//! Both methods read `q` and `limit` from the query string.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use earshot_core::{
  IngestError,
  ingest::ingest,
  source::{DEFAULT_FETCH_LIMIT, DEFAULT_QUERY, PostSource, clamp_fetch_limit},
  store::PostStore,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::verify_scrape, error::ApiError, extract::Query};

#[derive(Debug, Deserialize, Default)]
pub struct ScrapeParams {
  pub q:     Option<String>,
  /// Clamped into `1..=200`; defaults to 20.
  pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
  pub status:   &'static str,
  pub query:    String,
  pub limit:    u32,
  pub inserted: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub skipped:  Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:    Option<String>,
}

pub async fn handler<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  headers: HeaderMap,
  Query(params): Query<ScrapeParams>,
) -> Result<Response, ApiError>
where
  S: PostStore + 'static,
  P: PostSource + 'static,
{
  verify_scrape(&headers, &state.scrape)?;

  let query = params
    .q
    .map(|q| q.trim().to_owned())
    .filter(|q| !q.is_empty())
    .unwrap_or_else(|| DEFAULT_QUERY.to_owned());
  let limit = clamp_fetch_limit(params.limit.unwrap_or(DEFAULT_FETCH_LIMIT));

  match ingest(state.source.as_ref(), state.store.as_ref(), &query, limit).await {
    Ok(report) => Ok(
      Json(ScrapeResponse {
        status: "ok",
        query,
        limit,
        inserted: report.inserted,
        skipped: Some(report.skipped),
        error: None,
      })
      .into_response(),
    ),
    Err(IngestError::Source(e)) => Err(ApiError::Upstream(e)),
    Err(IngestError::Store(e)) => {
      tracing::error!(error = %e, query = %query, "failed to persist scraped posts");
      let body = ScrapeResponse {
        status: "error",
        query,
        limit,
        inserted: 0,
        skipped: None,
        error: Some(e.to_string()),
      };
      Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
    }
  }
}
