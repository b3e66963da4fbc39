//! Liveness and storage connectivity handlers.

use axum::{Json, extract::State};
use earshot_core::store::PostStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, extract::Query};

pub const RUNNING_MESSAGE: &str = "earshot backend is running";

/// `GET /`
pub async fn root() -> Json<Value> {
  Json(json!({ "status": "ok", "message": RUNNING_MESSAGE }))
}

#[derive(Debug, Deserialize)]
pub struct HelloParams {
  #[serde(default = "default_name")]
  pub name: String,
}

fn default_name() -> String { "world".to_owned() }

/// `GET /hello`
pub async fn hello(Query(params): Query<HelloParams>) -> Json<Value> {
  Json(json!({ "message": format!("Hello, {}!", params.name) }))
}

/// `GET /supabase-test`
///
/// A backend that answers with an error status is reported in the body, not
/// as a failed request.
pub async fn storage_probe<S, P, G>(
  State(state): State<AppState<S, P, G>>,
) -> Result<Json<Value>, ApiError>
where
  S: PostStore + 'static,
{
  let report = state
    .store
    .probe()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let status = if report.ok { "ok" } else { "error" };
  Ok(Json(json!({
    "status": status,
    "code": report.code,
    "data": report.data,
  })))
}
