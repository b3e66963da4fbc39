//! Handlers for the placeholder platform searches.

use axum::{Json, extract::State};
use earshot_core::stub::{DEFAULT_STUB_LIMIT, Platform, StubPost};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::Query};

#[derive(Debug, Deserialize, Default)]
pub struct StubParams {
  #[serde(default)]
  pub keyword: String,
  pub limit:   Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct StubResponse {
  pub platform: Platform,
  pub keyword:  String,
  pub results:  Vec<StubPost>,
}

fn search<S, P, G>(
  state: &AppState<S, P, G>,
  platform: Platform,
  params: StubParams,
) -> Result<Json<StubResponse>, ApiError> {
  let provider = state
    .stubs
    .get(platform)
    .ok_or_else(|| ApiError::NotFound(format!("no provider for {platform}")))?;

  let results = provider.fetch(&params.keyword, params.limit.unwrap_or(DEFAULT_STUB_LIMIT));
  Ok(Json(StubResponse { platform, keyword: params.keyword, results }))
}

/// `GET /twitter/search`
pub async fn twitter<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  Query(params): Query<StubParams>,
) -> Result<Json<StubResponse>, ApiError> {
  search(&state, Platform::Twitter, params)
}

/// `GET /instagram/search`
pub async fn instagram<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  Query(params): Query<StubParams>,
) -> Result<Json<StubResponse>, ApiError> {
  search(&state, Platform::Instagram, params)
}

/// `GET /facebook/search`
pub async fn facebook<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  Query(params): Query<StubParams>,
) -> Result<Json<StubResponse>, ApiError> {
  search(&state, Platform::Facebook, params)
}
