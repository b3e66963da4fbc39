//! The `PostStore` trait and supporting types.
//!
//! Implemented by storage backends (`earshot-store-rest`,
//! `earshot-store-sqlite`). The ingestion pipeline and the HTTP layer depend
//! on this abstraction, never on a concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::post::PostRecord;

/// Upper bound applied to every read limit before it reaches a backend.
pub const MAX_QUERY_LIMIT: u32 = 500;

/// Read limit used when the caller gives none.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;

/// Clamp a caller-supplied read limit into `1..=MAX_QUERY_LIMIT`.
pub fn clamp_query_limit(limit: u32) -> u32 {
  limit.clamp(1, MAX_QUERY_LIMIT)
}

// ─── Persistence policy ──────────────────────────────────────────────────────

/// How [`PostStore::persist`] treats a record whose `id` is already stored.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PersistMode {
  /// Replace the stored row sharing the same `id`, or insert.
  #[default]
  Upsert,
  /// Always insert a new row; repeated ids produce duplicate rows.
  Insert,
}

/// What the backend reported back for one [`PostStore::persist`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PersistOutcome {
  /// Rows the backend says it wrote, not the number submitted.
  pub inserted: usize,
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`PostStore::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
  /// Matched case-insensitively as a substring of `title` or `selftext`.
  pub keyword: String,
  /// Already clamped into `1..=MAX_QUERY_LIMIT`.
  pub limit:   u32,
}

impl SearchQuery {
  pub fn new(keyword: impl Into<String>, limit: Option<u32>) -> Self {
    Self {
      keyword: keyword.into(),
      limit:   clamp_query_limit(limit.unwrap_or(DEFAULT_QUERY_LIMIT)),
    }
  }
}

/// Result of a cheap connectivity read against the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
  pub ok:   bool,
  /// Backend status code (HTTP status for REST backends).
  pub code: u16,
  /// Whatever the backend returned, if anything.
  pub data: Option<serde_json::Value>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the post storage backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait PostStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The deduplication policy this store was configured with.
  fn mode(&self) -> PersistMode;

  /// Write `records` according to [`PostStore::mode`].
  ///
  /// An empty slice returns `inserted: 0` without touching the backend.
  fn persist<'a>(
    &'a self,
    records: &'a [PostRecord],
  ) -> impl Future<Output = Result<PersistOutcome, Self::Error>> + Send + 'a;

  /// Case-insensitive substring search over `title` and `selftext`, in the
  /// backend's natural order.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<PostRecord>, Self::Error>> + Send + 'a;

  /// Return up to `limit` stored posts. `limit` is clamped by the store.
  fn list(
    &self,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<PostRecord>, Self::Error>> + Send + '_;

  /// Read a handful of rows to check the backend is reachable.
  fn probe(
    &self,
  ) -> impl Future<Output = Result<ProbeReport, Self::Error>> + Send + '_;
}
