//! Handler for `POST /ai/reply-suggestion`.

use axum::{Json, extract::State};
use earshot_core::reply::{ReplyGenerator, ReplyRequest};
use serde::Serialize;

use crate::{AppState, error::ApiError, extract::JsonBody};

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
  pub suggestion: String,
  pub platform:   String,
}

pub async fn suggest<S, P, G>(
  State(state): State<AppState<S, P, G>>,
  JsonBody(request): JsonBody<ReplyRequest>,
) -> Result<Json<ReplyResponse>, ApiError>
where
  G: ReplyGenerator + 'static,
{
  let suggestion = state.replier.suggest(&request).await?;
  Ok(Json(ReplyResponse {
    suggestion,
    platform: request.platform().to_owned(),
  }))
}
