//! Error types for `earshot-core`.

use thiserror::Error;

/// Why a raw source post could not become a [`PostRecord`](crate::post::PostRecord).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
  #[error("post has no id")]
  MissingId,

  #[error("post {id} has no created_utc timestamp")]
  MissingTimestamp { id: String },

  #[error("post {id} has an unrepresentable created_utc: {value}")]
  InvalidTimestamp { id: String, value: f64 },
}

/// A failure of the fetch → normalize → persist pipeline.
#[derive(Debug, Error)]
pub enum IngestError {
  #[error("source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A failure to produce a reply suggestion.
#[derive(Debug, Error)]
pub enum ReplyError {
  /// The strategy is selected but not usable, e.g. a missing API key.
  #[error("configuration error: {0}")]
  Config(String),

  /// The external text-generation service failed or returned nothing.
  #[error("upstream error: {0}")]
  Upstream(String),
}
