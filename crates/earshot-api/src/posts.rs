//! Handlers for `/supabase/reddit_posts[/search]`.

use axum::{Json, extract::State};
use earshot_core::{
  post::PostRecord,
  store::{DEFAULT_QUERY_LIMIT, PostStore, SearchQuery},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError, extract::Query};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Clamped into `1..=500`; defaults to 100.
  pub limit: Option<u32>,
}

/// `GET /supabase/reddit_posts`
pub async fn list<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<PostRecord>>, ApiError>
where
  S: PostStore + 'static,
{
  let rows = state
    .store
    .list(params.limit.unwrap_or(DEFAULT_QUERY_LIMIT))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rows))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub keyword: Option<String>,
  pub limit:   Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
  pub keyword: String,
  pub results: Vec<PostRecord>,
}

/// `GET /supabase/reddit_posts/search`
pub async fn search<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError>
where
  S: PostStore + 'static,
{
  let keyword = params
    .keyword
    .filter(|k| !k.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("keyword must not be empty".into()))?;

  let query = SearchQuery::new(keyword, params.limit);
  let results = state
    .store
    .search(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(SearchResponse { keyword: query.keyword, results }))
}
